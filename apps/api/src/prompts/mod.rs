//! Prompt Template Store — resolves a named, versioned template to text.
//!
//! Templates ship compiled into the binary (see `templates.rs`). When a
//! prompts directory is configured, `<dir>/<version>/<name>.txt` takes
//! precedence, so prompts can be iterated on without a rebuild.

use std::path::PathBuf;

use thiserror::Error;

mod templates;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt not found: {name} ({version})")]
    NotFound { name: String, version: String },

    #[error("Failed to read prompt {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    override_dir: Option<PathBuf>,
}

impl PromptRegistry {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    pub fn load(&self, name: &str, version: &str) -> Result<String, PromptError> {
        let not_found = || PromptError::NotFound {
            name: name.to_string(),
            version: version.to_string(),
        };

        if !is_safe_segment(name) || !is_safe_segment(version) {
            return Err(not_found());
        }

        if let Some(dir) = &self.override_dir {
            let path = dir.join(version).join(format!("{name}.txt"));
            if path.is_file() {
                return std::fs::read_to_string(&path).map_err(|source| PromptError::Io { path, source });
            }
        }

        templates::builtin(name, version)
            .map(str::to_string)
            .ok_or_else(not_found)
    }
}

/// Names and versions become path segments; reject anything that could escape the directory.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !segment.contains("..")
}

/// Substitutes each `{key}` placeholder by exact string match in a single
/// left-to-right pass. Inserted values are never rescanned; braces that do
/// not name a known key are copied through.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let matched = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });
        match matched {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resume_prompt_has_placeholder() {
        let registry = PromptRegistry::default();
        let template = registry.load("resume_extract", "v1").unwrap();
        assert!(template.contains("{resume_text}"));
    }

    #[test]
    fn test_unknown_version_is_not_found() {
        let registry = PromptRegistry::default();
        assert!(matches!(
            registry.load("resume_extract", "v7"),
            Err(PromptError::NotFound { .. })
        ));
    }

    #[test]
    fn test_path_traversal_is_not_found() {
        let registry = PromptRegistry::new(Some(PathBuf::from("/tmp")));
        assert!(matches!(
            registry.load("../secrets", "v1"),
            Err(PromptError::NotFound { .. })
        ));
    }

    #[test]
    fn test_directory_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("v1")).unwrap();
        std::fs::write(
            dir.path().join("v1").join("resume_extract.txt"),
            "custom {resume_text}",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("v2")).unwrap();
        std::fs::write(dir.path().join("v2").join("resume_extract.txt"), "v2 {resume_text}").unwrap();

        let registry = PromptRegistry::new(Some(dir.path().to_path_buf()));
        assert_eq!(registry.load("resume_extract", "v1").unwrap(), "custom {resume_text}");
        assert_eq!(registry.load("resume_extract", "v2").unwrap(), "v2 {resume_text}");
        // falls back to the builtin set when the directory has no match
        assert!(registry.load("mock_questions", "v1").is_ok());
    }

    #[test]
    fn test_render_substitutes_exact_placeholders() {
        let out = render(
            "Role: {job_title}\n{resume_text}\n{\"json\": true}",
            &[("job_title", "Data Analyst"), ("resume_text", "Ada Lovelace")],
        );
        assert_eq!(out, "Role: Data Analyst\nAda Lovelace\n{\"json\": true}");
    }

    #[test]
    fn test_render_does_not_rescan_inserted_values() {
        let out = render(
            "Role: {job_title}\nCV: {resume_text}",
            &[
                ("resume_text", "I wrote the {job_title} parser"),
                ("job_title", "Data Engineer"),
            ],
        );
        assert_eq!(out, "Role: Data Engineer\nCV: I wrote the {job_title} parser");
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_braces() {
        assert_eq!(
            render("{{job_title}} {unknown} {open", &[("job_title", "Analyst")]),
            "{Analyst} {unknown} {open"
        );
    }
}
