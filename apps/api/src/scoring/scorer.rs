//! Rubric Scoring Engine — pure mapping from a `ResumeExtract` to a `ScoreResult`.
//!
//! No I/O and no failure modes: absent fields contribute zero points plus a
//! reason code and a recommendation. Categories are evaluated in a fixed
//! order (contact, summary, skills, experience, education, projects), which
//! is also the order of reasons and recommendations in the output.

use serde::{Deserialize, Serialize};

use super::explain::ReasonCode;
use super::rubric::{Category, Rubric};
use crate::extraction::models::{ExperienceItem, ResumeExtract};

pub const MAX_RECOMMENDATIONS: usize = 5;

/// Technical skills needed for full skills points; `PARTIAL_SKILLS` earns partial credit.
const FULL_SKILLS: usize = 8;
const PARTIAL_SKILLS: usize = 4;
const SKILLS_PARTIAL_PERCENT: u32 = 60;
const EXPERIENCE_NO_METRICS_PERCENT: u32 = 66;

const REC_SUMMARY: &str =
    "Add a concise 2–3 line professional summary tailored to your target role.";
const REC_SKILLS_EXPAND: &str =
    "Expand your skills section to 8–15 role-relevant tools and technologies.";
const REC_SKILLS_ADD: &str =
    "Add a dedicated Skills section with core tools, frameworks, and technologies.";
const REC_METRICS: &str =
    "Add measurable impact to experience (e.g., % improvement, scale, users, performance).";
const REC_EXPERIENCE: &str =
    "Add at least one experience entry (job, internship, research, or major project).";
const REC_EDUCATION: &str =
    "Include education details (degree, institution, dates, relevant modules).";
const REC_PROJECTS: &str = "Add 2–3 projects with clear outcomes and a technology stack.";

// ────────────────────────────────────────────────────────────────────────────
// Output models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPoints {
    pub points: u32,
    pub max: u32,
    /// Technical skills counted (skills only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Experience entries seen (experience only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
}

impl CategoryPoints {
    fn new(points: u32, max: u32) -> Self {
        Self {
            points,
            max,
            count: None,
            entries: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub contact: CategoryPoints,
    pub summary: CategoryPoints,
    pub skills: CategoryPoints,
    pub experience: CategoryPoints,
    pub education: CategoryPoints,
    pub projects: CategoryPoints,
}

impl Breakdown {
    fn categories(&self) -> [&CategoryPoints; 6] {
        [
            &self.contact,
            &self.summary,
            &self.skills,
            &self.experience,
            &self.education,
            &self.projects,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub breakdown: Breakdown,
    pub reasons: Vec<ReasonCode>,
    pub reasons_human: Vec<String>,
    pub recommendations: Vec<String>,
    pub rubric_version: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Findings {
    reasons: Vec<ReasonCode>,
    recommendations: Vec<&'static str>,
}

impl Findings {
    fn flag(&mut self, reason: ReasonCode, recommendation: &'static str) {
        self.reasons.push(reason);
        self.recommendations.push(recommendation);
    }
}

#[cfg(test)]
pub fn score(resume: &ResumeExtract) -> ScoreResult {
    score_with_rubric(resume, &Rubric::v1_uk().unwrap())
}

pub fn score_with_rubric(resume: &ResumeExtract, rubric: &Rubric) -> ScoreResult {
    let mut findings = Findings::default();

    let contact = score_contact(resume, rubric.max_for(Category::Contact));
    let summary = score_summary(resume, rubric.max_for(Category::Summary), &mut findings);
    let skills = score_skills(resume, rubric.max_for(Category::Skills), &mut findings);
    let experience = score_experience(resume, rubric.max_for(Category::Experience), &mut findings);
    let education = score_presence(
        !resume.education.is_empty(),
        rubric.max_for(Category::Education),
        (ReasonCode::MissingEducation, REC_EDUCATION),
        &mut findings,
    );
    let projects = score_presence(
        !resume.projects.is_empty(),
        rubric.max_for(Category::Projects),
        (ReasonCode::MissingProjects, REC_PROJECTS),
        &mut findings,
    );

    let breakdown = Breakdown {
        contact,
        summary,
        skills,
        experience,
        education,
        projects,
    };

    let Findings {
        reasons,
        recommendations,
    } = findings;

    ScoreResult {
        score: normalized_total(&breakdown),
        reasons_human: reasons.iter().map(|r| r.explanation().to_string()).collect(),
        recommendations: recommendations
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(str::to_string)
            .collect(),
        reasons,
        breakdown,
        rubric_version: rubric.version().to_string(),
    }
}

/// round(earned / max × 100), clamped to 0..=100.
fn normalized_total(breakdown: &Breakdown) -> u32 {
    let (earned, max) = breakdown
        .categories()
        .iter()
        .fold((0u32, 0u32), |(e, m), c| (e + c.points, m + c.max));
    if max == 0 {
        return 0;
    }
    let pct = (f64::from(earned) / f64::from(max) * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// One third of the category per present field: name, email, phone.
fn score_contact(resume: &ResumeExtract, max: u32) -> CategoryPoints {
    let per_field = max / 3;
    let present = [&resume.name, &resume.email, &resume.phone]
        .iter()
        .filter(|field| !field.is_empty())
        .count() as u32;
    CategoryPoints::new(per_field * present, max)
}

fn score_summary(resume: &ResumeExtract, max: u32, findings: &mut Findings) -> CategoryPoints {
    if resume.summary.trim().is_empty() {
        findings.flag(ReasonCode::MissingSummary, REC_SUMMARY);
        CategoryPoints::new(0, max)
    } else {
        CategoryPoints::new(max, max)
    }
}

fn score_skills(resume: &ResumeExtract, max: u32, findings: &mut Findings) -> CategoryPoints {
    let count = resume.skills.technical.len();
    let points = if count >= FULL_SKILLS {
        max
    } else if count >= PARTIAL_SKILLS {
        findings.flag(ReasonCode::FewSkills, REC_SKILLS_EXPAND);
        max * SKILLS_PARTIAL_PERCENT / 100
    } else {
        findings.flag(ReasonCode::FewSkills, REC_SKILLS_ADD);
        0
    };
    CategoryPoints {
        count: Some(count),
        ..CategoryPoints::new(points, max)
    }
}

fn score_experience(resume: &ResumeExtract, max: u32, findings: &mut Findings) -> CategoryPoints {
    let entries = resume.experience.len();
    let points = if entries == 0 {
        findings.flag(ReasonCode::MissingExperience, REC_EXPERIENCE);
        0
    } else if has_measurable_impact(&resume.experience) {
        max
    } else {
        findings.flag(ReasonCode::NoMetrics, REC_METRICS);
        max * EXPERIENCE_NO_METRICS_PERCENT / 100
    };
    CategoryPoints {
        entries: Some(entries),
        ..CategoryPoints::new(points, max)
    }
}

fn score_presence(
    present: bool,
    max: u32,
    (reason, recommendation): (ReasonCode, &'static str),
    findings: &mut Findings,
) -> CategoryPoints {
    if present {
        CategoryPoints::new(max, max)
    } else {
        findings.flag(reason, recommendation);
        CategoryPoints::new(0, max)
    }
}

/// Metrics, then bullets, then the entry's whole serialized form. Any digit
/// anywhere counts, dates included.
fn has_measurable_impact(experience: &[ExperienceItem]) -> bool {
    experience.iter().any(|entry| {
        entry.metrics.iter().any(|m| text_has_metrics(m))
            || entry.bullets.iter().any(|b| text_has_metrics(b))
            || serde_json::to_string(entry)
                .map(|s| text_has_metrics(&s))
                .unwrap_or(false)
    })
}

fn text_has_metrics(text: &str) -> bool {
    text.chars().any(|c| c == '%' || c == '+' || c.is_numeric())
}
