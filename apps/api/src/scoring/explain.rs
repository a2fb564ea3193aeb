use serde::{Deserialize, Serialize};

/// Stable machine-readable identifier for a scoring deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    MissingSummary,
    FewSkills,
    MissingExperience,
    NoMetrics,
    MissingEducation,
    MissingProjects,
}

impl ReasonCode {
    pub fn code(self) -> &'static str {
        match self {
            ReasonCode::MissingSummary => "missing_summary",
            ReasonCode::FewSkills => "few_skills",
            ReasonCode::MissingExperience => "missing_experience",
            ReasonCode::NoMetrics => "no_metrics",
            ReasonCode::MissingEducation => "missing_education",
            ReasonCode::MissingProjects => "missing_projects",
        }
    }

    /// Audit/display text. Independent of the recommendation attached at scoring time.
    pub fn explanation(self) -> &'static str {
        match self {
            ReasonCode::MissingSummary => "Summary section is missing or empty.",
            ReasonCode::FewSkills => "Skills section has too few items for the target role.",
            ReasonCode::MissingExperience => "No experience entries were detected.",
            ReasonCode::NoMetrics => "Experience lacks measurable impact (numbers, %, scale).",
            ReasonCode::MissingEducation => "Education details are missing.",
            ReasonCode::MissingProjects => {
                "No projects were detected; strong CVs usually include 2–3."
            }
        }
    }
}
