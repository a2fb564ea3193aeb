//! Resume Pipeline — text → extract → score → persist, strictly in that order.
//!
//! Nothing is written unless every earlier step succeeded.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::repository::ResumeRepository;
use crate::documents::{DocumentError, TextExtractor, UploadedDocument};
use crate::extraction::{ExtractionError, ResumeExtractor};
use crate::models::resume::{NewResume, ResumeRow};
use crate::scoring::{score_with_rubric, Rubric};

/// Characters of source text kept on the stored record.
pub const RAW_TEXT_CAP: usize = 12_000;
const TRUNCATION_MARKER: &str = "\n\n...[truncated]";
const EXTRACTION_PROMPT_VERSION: &str = "v1";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Could not extract text from resume")]
    EmptyDocument,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub struct ResumeService {
    text_extractor: Arc<dyn TextExtractor>,
    extractor: ResumeExtractor,
    repository: Arc<dyn ResumeRepository>,
    rubric: Rubric,
}

impl ResumeService {
    pub fn new(
        text_extractor: Arc<dyn TextExtractor>,
        extractor: ResumeExtractor,
        repository: Arc<dyn ResumeRepository>,
        rubric: Rubric,
    ) -> Self {
        Self {
            text_extractor,
            extractor,
            repository,
            rubric,
        }
    }

    pub async fn ingest_and_analyze(
        &self,
        document: &UploadedDocument,
        uploader: &str,
    ) -> Result<Uuid, IngestError> {
        let started = Instant::now();
        let file_name = document.file_name.to_lowercase();

        // Postgres TEXT rejects NUL, which PDF extraction can emit
        let text = self
            .text_extractor
            .extract_text(document)
            .await?
            .replace('\0', "");
        if text.trim().is_empty() {
            info!(uploader, file_name = %file_name, "resume_text_extract_failed");
            return Err(IngestError::EmptyDocument);
        }

        let extract = self
            .extractor
            .extract_resume(&text, EXTRACTION_PROMPT_VERSION)
            .await?;
        let score = score_with_rubric(&extract.resume, &self.rubric);
        let resume_score = score.score;
        let reasons: Vec<&str> = score.reasons.iter().map(|r| r.code()).collect();

        let record = NewResume {
            uploader: uploader.to_string(),
            file_name: file_name.clone(),
            uploaded_at: Utc::now(),
            raw_text: cap_text(&text, RAW_TEXT_CAP),
            extract,
            scoring_version: score.rubric_version.clone(),
            score,
        };
        let resume_id = self.repository.create(record).await?;

        info!(
            uploader,
            resume_id = %resume_id,
            file_name = %file_name,
            latency_ms = started.elapsed().as_millis() as u64,
            score = resume_score,
            reasons = %reasons.join(","),
            scoring_version = self.rubric.version(),
            "resume_ingest_ok"
        );
        Ok(resume_id)
    }

    pub async fn list_uploads(&self, uploader: &str) -> anyhow::Result<Vec<ResumeRow>> {
        let rows = self.repository.list_for(uploader).await?;
        info!(uploader, count = rows.len(), "resume_list_ok");
        Ok(rows)
    }

    /// `None` when the id is unknown or belongs to someone else.
    pub async fn get_resume(&self, id: Uuid, uploader: &str) -> anyhow::Result<Option<ResumeRow>> {
        let row = self.repository.find_one(id, uploader).await?;
        match &row {
            Some(_) => info!(uploader, resume_id = %id, "resume_get_ok"),
            None => info!(uploader, resume_id = %id, "resume_get_not_found"),
        }
        Ok(row)
    }
}

/// Keeps the first `limit` characters and appends a marker when anything was cut.
fn cap_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fixtures::{sample_payload, SAMPLE_RESUME_TEXT};
    use crate::llm_client::testing::{test_settings, ScriptedProvider};
    use crate::llm_client::LlmGateway;
    use crate::prompts::PromptRegistry;
    use crate::resumes::repository::memory::InMemoryResumeRepository;
    use crate::scoring::explain::ReasonCode;
    use async_trait::async_trait;

    struct FixedText(String);

    #[async_trait]
    impl TextExtractor for FixedText {
        async fn extract_text(&self, _: &UploadedDocument) -> Result<String, DocumentError> {
            Ok(self.0.clone())
        }
    }

    struct Harness {
        service: ResumeService,
        provider: Arc<ScriptedProvider>,
        repository: Arc<InMemoryResumeRepository>,
    }

    fn harness(text: &str, provider: ScriptedProvider, repository: InMemoryResumeRepository) -> Harness {
        let provider = Arc::new(provider);
        let repository = Arc::new(repository);
        let gateway = Arc::new(LlmGateway::with_provider(test_settings(), provider.clone()));
        let service = ResumeService::new(
            Arc::new(FixedText(text.to_string())),
            ResumeExtractor::new(gateway, PromptRegistry::default()),
            repository.clone(),
            Rubric::v1_uk().unwrap(),
        );
        Harness {
            service,
            provider,
            repository,
        }
    }

    fn upload() -> UploadedDocument {
        UploadedDocument::new("Ada_Lovelace_CV.TXT", SAMPLE_RESUME_TEXT)
    }

    #[tokio::test]
    async fn test_ingest_persists_scored_record() {
        let h = harness(
            SAMPLE_RESUME_TEXT,
            ScriptedProvider::new().then_ok(sample_payload().to_string()),
            InMemoryResumeRepository::new(),
        );

        let id = h
            .service
            .ingest_and_analyze(&upload(), "ada@example.co.uk")
            .await
            .unwrap();

        let row = h
            .service
            .get_resume(id, "ada@example.co.uk")
            .await
            .unwrap()
            .expect("stored record");
        assert_eq!(row.file_name, "ada_lovelace_cv.txt");
        assert_eq!(row.uploader, "ada@example.co.uk");
        assert_eq!(row.raw_text, SAMPLE_RESUME_TEXT);
        assert_eq!(row.extract.resume.name, "Ada Lovelace");
        assert_eq!(row.extract.meta.analysis_version, "v1");
        assert_eq!(row.resume_score, 100);
        assert_eq!(row.score.score, 100);
        assert_eq!(row.scoring_version, "v1_uk");
        assert_eq!(h.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_record_is_scoped_to_uploader() {
        let h = harness(
            SAMPLE_RESUME_TEXT,
            ScriptedProvider::new().otherwise(sample_payload().to_string()),
            InMemoryResumeRepository::new(),
        );
        let id = h
            .service
            .ingest_and_analyze(&upload(), "ada@example.co.uk")
            .await
            .unwrap();

        assert!(h.service.get_resume(id, "eve@example.com").await.unwrap().is_none());
        assert!(h.service.list_uploads("eve@example.com").await.unwrap().is_empty());
        assert!(h
            .service
            .get_resume(Uuid::new_v4(), "ada@example.co.uk")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_uploads_listed_newest_first() {
        let h = harness(
            SAMPLE_RESUME_TEXT,
            ScriptedProvider::new().otherwise(sample_payload().to_string()),
            InMemoryResumeRepository::new(),
        );
        let first = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await.unwrap();

        let ids: Vec<Uuid> = h
            .service
            .list_uploads("ada@example.co.uk")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_blank_document_fails_before_extraction() {
        let h = harness(
            "  \n\t ",
            ScriptedProvider::new().otherwise("{}"),
            InMemoryResumeRepository::new(),
        );

        let result = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await;
        assert!(matches!(result, Err(IngestError::EmptyDocument)));
        assert_eq!(h.provider.calls(), 0);
        assert_eq!(h.repository.len(), 0);
    }

    #[tokio::test]
    async fn test_schema_failure_writes_nothing() {
        let h = harness(
            SAMPLE_RESUME_TEXT,
            ScriptedProvider::new().otherwise(r#"{"projects": {"name": "not a list"}}"#),
            InMemoryResumeRepository::new(),
        );

        let result = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await;
        assert!(matches!(
            result,
            Err(IngestError::Extraction(ExtractionError::SchemaValidation(_)))
        ));
        assert_eq!(h.repository.len(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let h = harness(
            SAMPLE_RESUME_TEXT,
            ScriptedProvider::new().otherwise(sample_payload().to_string()),
            InMemoryResumeRepository::failing(),
        );

        let result = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await;
        assert!(matches!(result, Err(IngestError::Storage(_))));
    }

    #[tokio::test]
    async fn test_sparse_extract_is_still_scored() {
        let h = harness(
            SAMPLE_RESUME_TEXT,
            ScriptedProvider::new().otherwise(r#"{"name": "Ada Lovelace", "email": "ada@example.co.uk"}"#),
            InMemoryResumeRepository::new(),
        );
        let id = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await.unwrap();
        let row = h.service.get_resume(id, "ada@example.co.uk").await.unwrap().unwrap();

        assert_eq!(row.resume_score, 10);
        assert!(row.score.reasons.contains(&ReasonCode::MissingExperience));
    }

    #[tokio::test]
    async fn test_nul_characters_are_stripped_before_analysis() {
        let h = harness(
            &format!("{SAMPLE_RESUME_TEXT}\0\0"),
            ScriptedProvider::new().otherwise(sample_payload().to_string()),
            InMemoryResumeRepository::new(),
        );
        let id = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await.unwrap();
        let row = h.service.get_resume(id, "ada@example.co.uk").await.unwrap().unwrap();

        assert_eq!(row.raw_text, SAMPLE_RESUME_TEXT);
        assert!(!h.provider.last_request().unwrap().messages[0].content.contains('\0'));
    }

    #[tokio::test]
    async fn test_nul_only_document_is_empty() {
        let h = harness(
            "\0 \0\n",
            ScriptedProvider::new().otherwise("{}"),
            InMemoryResumeRepository::new(),
        );
        let result = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await;
        assert!(matches!(result, Err(IngestError::EmptyDocument)));
        assert_eq!(h.provider.calls(), 0);
    }

    #[test]
    fn test_cap_text_appends_marker_only_when_cut() {
        assert_eq!(cap_text("short", 10), "short");
        assert_eq!(cap_text("0123456789", 10), "0123456789");
        assert_eq!(cap_text("0123456789ab", 10), "0123456789\n\n...[truncated]");
    }

    #[test]
    fn test_cap_text_counts_characters_not_bytes() {
        let text = "é".repeat(12);
        assert_eq!(cap_text(&text, 10), format!("{}{TRUNCATION_MARKER}", "é".repeat(10)));
    }

    #[tokio::test]
    async fn test_long_source_text_is_capped_on_the_record() {
        let long_text = format!("{SAMPLE_RESUME_TEXT}\n{}", "x".repeat(RAW_TEXT_CAP));
        let h = harness(
            &long_text,
            ScriptedProvider::new().otherwise(sample_payload().to_string()),
            InMemoryResumeRepository::new(),
        );
        let id = h.service.ingest_and_analyze(&upload(), "ada@example.co.uk").await.unwrap();
        let row = h.service.get_resume(id, "ada@example.co.uk").await.unwrap().unwrap();

        assert!(row.raw_text.ends_with(TRUNCATION_MARKER));
        assert_eq!(row.raw_text.chars().count(), RAW_TEXT_CAP + TRUNCATION_MARKER.chars().count());
    }
}
