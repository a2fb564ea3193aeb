use serde::{Deserialize, Serialize};

// Every record defaults field-by-field: a partial model reply degrades to
// empty strings and lists instead of failing. Shape checks live in `schema.rs`.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Links {
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub technical: Vec<String>,
    pub tools: Vec<String>,
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub cloud: Vec<String>,
    pub databases: Vec<String>,
    pub ml_ai: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub location: String,
    pub dates: String,
    pub modules: Vec<String>,
    pub grade: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub company: String,
    pub title: String,
    pub location: String,
    pub dates: String,
    pub bullets: Vec<String>,
    pub metrics: Vec<String>,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    pub name: String,
    pub description: String,
    pub bullets: Vec<String>,
    pub metrics: Vec<String>,
    pub tech_stack: Vec<String>,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationItem {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

/// Verbatim snippets from the source text backing the identity fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
}

/// Model self-reported confidence per category, 0–100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Confidence {
    pub contact: u8,
    pub summary: u8,
    pub skills: u8,
    pub experience: u8,
    pub education: u8,
    pub projects: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeExtract {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub links: Links,
    pub summary: String,
    pub skills: Skills,
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
    pub projects: Vec<ProjectItem>,
    pub certifications: Vec<CertificationItem>,
    pub publications: Vec<String>,
    pub awards: Vec<String>,
    pub volunteering: Vec<String>,
    pub evidence: Evidence,
    pub confidence: Confidence,
}
