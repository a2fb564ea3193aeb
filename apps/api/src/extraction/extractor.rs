use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::models::ResumeExtract;
use super::schema::{decode_resume, SchemaViolation};
use crate::llm_client::{ChatRequest, ChatResponse, LlmError, LlmGateway};
use crate::prompts::{render, PromptError, PromptRegistry};

/// Trimmed resume text shorter than this is rejected before any model call.
pub const MIN_RESUME_CHARS: usize = 50;

const EXTRACT_PROMPT: &str = "resume_extract";
const EXTRACT_TEMPERATURE: f32 = 0.2;
const EXTRACT_MAX_TOKENS: u32 = 1400;
const SOURCE_MARKER: &str = "llm_json";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Resume text is too short to analyze ({chars} characters, need at least 50)")]
    InputTooShort { chars: usize },

    #[error("Could not analyze resume: model output failed validation at {0}")]
    SchemaValidation(#[from] SchemaViolation),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Gateway(#[from] LlmError),
}

/// Provenance of an extract, copied from the gateway response that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMeta {
    pub analysis_version: String,
    pub source: String,
    pub llm_model: String,
    pub llm_latency_ms: u64,
    pub cache_hit: bool,
}

impl ExtractionMeta {
    fn from_response(analysis_version: &str, response: &ChatResponse) -> Self {
        Self {
            analysis_version: analysis_version.to_string(),
            source: SOURCE_MARKER.to_string(),
            llm_model: response.model.clone(),
            llm_latency_ms: response.latency_ms,
            cache_hit: response.cache_hit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedResume {
    #[serde(flatten)]
    pub resume: ResumeExtract,
    pub meta: ExtractionMeta,
}

pub struct ResumeExtractor {
    gateway: Arc<LlmGateway>,
    prompts: PromptRegistry,
}

impl ResumeExtractor {
    pub fn new(gateway: Arc<LlmGateway>, prompts: PromptRegistry) -> Self {
        Self { gateway, prompts }
    }

    /// Renders the versioned extraction prompt, makes one JSON-mode gateway
    /// call and decodes the reply. Model output of the wrong shape is not retried.
    pub async fn extract_resume(
        &self,
        text: &str,
        prompt_version: &str,
    ) -> Result<ExtractedResume, ExtractionError> {
        let chars = text.trim().chars().count();
        if chars < MIN_RESUME_CHARS {
            return Err(ExtractionError::InputTooShort { chars });
        }

        let template = self.prompts.load(EXTRACT_PROMPT, prompt_version)?;
        let prompt = render(&template, &[("resume_text", text)]);
        let request = ChatRequest::user(prompt)
            .json_mode(true)
            .temperature(EXTRACT_TEMPERATURE)
            .max_tokens(EXTRACT_MAX_TOKENS);

        let response = self.gateway.call(&request).await?;
        let payload = response
            .json
            .as_ref()
            .ok_or_else(|| SchemaViolation::new("$", "no JSON payload in response"))?;

        let resume = decode_resume(payload).map_err(|violation| {
            warn!(
                model = %response.model,
                cache_hit = response.cache_hit,
                error = %violation,
                "resume_extract_schema_failed"
            );
            violation
        })?;

        Ok(ExtractedResume {
            resume,
            meta: ExtractionMeta::from_response(prompt_version, &response),
        })
    }
}
