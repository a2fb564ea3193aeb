//! Declarative shape check for untrusted model output.
//!
//! `decode_resume` is the single boundary where untyped JSON becomes a
//! `ResumeExtract`. Missing or null fields take their defaults and unknown
//! fields are dropped; a value of the wrong shape anywhere in the tree rejects
//! the whole payload with the path of the first offending value.

use serde_json::{Map, Value};
use thiserror::Error;

use super::models::ResumeExtract;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn mismatch(path: &str, expected: &str, found: &Value) -> Self {
        Self::new(path, format!("expected {expected}, found {}", kind_name(found)))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    TextList,
    /// Integer clamped into 0..=100.
    Score,
    Object(&'static [Field]),
    ObjectList(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind }
}

const LINKS: &[Field] = &[
    field("linkedin", FieldKind::Text),
    field("github", FieldKind::Text),
    field("portfolio", FieldKind::Text),
    field("other", FieldKind::TextList),
];

const SKILLS: &[Field] = &[
    field("technical", FieldKind::TextList),
    field("tools", FieldKind::TextList),
    field("languages", FieldKind::TextList),
    field("frameworks", FieldKind::TextList),
    field("cloud", FieldKind::TextList),
    field("databases", FieldKind::TextList),
    field("ml_ai", FieldKind::TextList),
    field("other", FieldKind::TextList),
];

const EDUCATION_ITEM: &[Field] = &[
    field("institution", FieldKind::Text),
    field("degree", FieldKind::Text),
    field("field", FieldKind::Text),
    field("location", FieldKind::Text),
    field("dates", FieldKind::Text),
    field("modules", FieldKind::TextList),
    field("grade", FieldKind::Text),
];

const EXPERIENCE_ITEM: &[Field] = &[
    field("company", FieldKind::Text),
    field("title", FieldKind::Text),
    field("location", FieldKind::Text),
    field("dates", FieldKind::Text),
    field("bullets", FieldKind::TextList),
    field("metrics", FieldKind::TextList),
    field("tech_stack", FieldKind::TextList),
];

const PROJECT_ITEM: &[Field] = &[
    field("name", FieldKind::Text),
    field("description", FieldKind::Text),
    field("bullets", FieldKind::TextList),
    field("metrics", FieldKind::TextList),
    field("tech_stack", FieldKind::TextList),
    field("link", FieldKind::Text),
];

const CERTIFICATION_ITEM: &[Field] = &[
    field("name", FieldKind::Text),
    field("issuer", FieldKind::Text),
    field("date", FieldKind::Text),
];

const EVIDENCE: &[Field] = &[
    field("name", FieldKind::Text),
    field("email", FieldKind::Text),
    field("phone", FieldKind::Text),
    field("location", FieldKind::Text),
    field("summary", FieldKind::Text),
];

const CONFIDENCE: &[Field] = &[
    field("contact", FieldKind::Score),
    field("summary", FieldKind::Score),
    field("skills", FieldKind::Score),
    field("experience", FieldKind::Score),
    field("education", FieldKind::Score),
    field("projects", FieldKind::Score),
    field("overall", FieldKind::Score),
];

pub const RESUME_SCHEMA: &[Field] = &[
    field("name", FieldKind::Text),
    field("email", FieldKind::Text),
    field("phone", FieldKind::Text),
    field("location", FieldKind::Text),
    field("links", FieldKind::Object(LINKS)),
    field("summary", FieldKind::Text),
    field("skills", FieldKind::Object(SKILLS)),
    field("education", FieldKind::ObjectList(EDUCATION_ITEM)),
    field("experience", FieldKind::ObjectList(EXPERIENCE_ITEM)),
    field("projects", FieldKind::ObjectList(PROJECT_ITEM)),
    field("certifications", FieldKind::ObjectList(CERTIFICATION_ITEM)),
    field("publications", FieldKind::TextList),
    field("awards", FieldKind::TextList),
    field("volunteering", FieldKind::TextList),
    field("evidence", FieldKind::Object(EVIDENCE)),
    field("confidence", FieldKind::Object(CONFIDENCE)),
];

pub fn decode_resume(payload: &Value) -> Result<ResumeExtract, SchemaViolation> {
    let conformed = conform_object(payload, RESUME_SCHEMA, "$")?;
    serde_json::from_value(conformed).map_err(|e| SchemaViolation::new("$", e.to_string()))
}

/// Returns a copy of `value` holding only the schema's fields, each checked for shape.
pub fn conform_object(value: &Value, fields: &[Field], path: &str) -> Result<Value, SchemaViolation> {
    let object = value
        .as_object()
        .ok_or_else(|| SchemaViolation::mismatch(path, "object", value))?;

    let mut out = Map::new();
    for field in fields {
        match object.get(field.name) {
            None | Some(Value::Null) => {}
            Some(v) => {
                let child_path = format!("{path}.{}", field.name);
                out.insert(field.name.to_string(), conform_field(v, field.kind, &child_path)?);
            }
        }
    }
    Ok(Value::Object(out))
}

fn conform_field(value: &Value, kind: FieldKind, path: &str) -> Result<Value, SchemaViolation> {
    match kind {
        FieldKind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(SchemaViolation::mismatch(path, "string", other)),
        },
        FieldKind::TextList => {
            let items = as_array(value, path)?;
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    return Err(SchemaViolation::mismatch(&format!("{path}[{i}]"), "string", item));
                }
            }
            Ok(value.clone())
        }
        FieldKind::Score => {
            let n = value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(|| SchemaViolation::mismatch(path, "integer", value))?;
            Ok(Value::from(n.clamp(0, 100)))
        }
        FieldKind::Object(fields) => conform_object(value, fields, path),
        FieldKind::ObjectList(fields) => {
            let items = as_array(value, path)?;
            let conformed = items
                .iter()
                .enumerate()
                .map(|(i, item)| conform_object(item, fields, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(conformed))
        }
    }
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, SchemaViolation> {
    value
        .as_array()
        .ok_or_else(|| SchemaViolation::mismatch(path, "array", value))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
