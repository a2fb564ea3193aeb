use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::extraction::ExtractedResume;
use crate::scoring::ScoreResult;

/// A fully analyzed upload, ready to persist. Built once per ingestion and never mutated.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub uploader: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub raw_text: String,
    pub extract: ExtractedResume,
    pub score: ScoreResult,
    pub scoring_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub uploader: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub raw_text: String,
    pub extract: Json<ExtractedResume>,
    pub score: Json<ScoreResult>,
    pub resume_score: i32,
    pub scoring_version: String,
}

impl ResumeRow {
    /// Row as the database would return it for a freshly inserted record.
    #[cfg(test)]
    pub fn from_new(id: Uuid, record: NewResume) -> Self {
        Self {
            id,
            resume_score: record.score.score as i32,
            uploader: record.uploader,
            file_name: record.file_name,
            uploaded_at: record.uploaded_at,
            raw_text: record.raw_text,
            extract: Json(record.extract),
            score: Json(record.score),
            scoring_version: record.scoring_version,
        }
    }
}

/// List view of an upload.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub name: String,
    pub resume_score: i32,
    pub scoring_version: String,
}

impl From<&ResumeRow> for ResumeSummary {
    fn from(row: &ResumeRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name.clone(),
            uploaded_at: row.uploaded_at,
            name: row.extract.resume.name.clone(),
            resume_score: row.resume_score,
            scoring_version: row.scoring_version.clone(),
        }
    }
}
