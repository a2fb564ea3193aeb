use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumeRow};

/// Storage for analyzed uploads. Every read is scoped to the uploader.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn create(&self, record: NewResume) -> Result<Uuid>;

    async fn find_one(&self, id: Uuid, owner: &str) -> Result<Option<ResumeRow>>;

    /// Newest upload first.
    async fn list_for(&self, owner: &str) -> Result<Vec<ResumeRow>>;
}

pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, uploader, file_name, uploaded_at, raw_text, extract, score, \
     resume_score, scoring_version FROM parsed_resumes";

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn create(&self, record: NewResume) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO parsed_resumes
                (id, uploader, file_name, uploaded_at, raw_text, extract, score,
                 resume_score, scoring_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(&record.uploader)
        .bind(&record.file_name)
        .bind(record.uploaded_at)
        .bind(&record.raw_text)
        .bind(Json(&record.extract))
        .bind(Json(&record.score))
        .bind(record.score.score as i32)
        .bind(&record.scoring_version)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_one(&self, id: Uuid, owner: &str) -> Result<Option<ResumeRow>> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 AND uploader = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for(&self, owner: &str) -> Result<Vec<ResumeRow>> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "{SELECT_COLUMNS} WHERE uploader = $1 ORDER BY uploaded_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
