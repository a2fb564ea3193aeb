use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::prompts::{wrap, CAREER_ADVICE_RULES, COVER_LETTER_RULES, MOCK_QUESTIONS_RULES};
use crate::llm_client::{ChatRequest, LlmError, LlmGateway};
use crate::prompts::{render, PromptError, PromptRegistry};

const PROMPT_VERSION: &str = "v1";

const MIN_RESUME_TEXT: usize = 50;
const MIN_JOB_TITLE: usize = 2;
const MIN_JOB_DESCRIPTION: usize = 20;
const MIN_QUESTION: usize = 10;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{field} is required (at least {min} characters)")]
    Validation { field: &'static str, min: usize },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Gateway(#[from] LlmError),

    #[error("Model returned an unexpected structure: {0}")]
    InvalidOutput(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockQuestion {
    pub question: String,
    pub category: String,
    pub rationale: String,
    pub what_good_looks_like: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockQuestions {
    pub questions: Vec<MockQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanStep {
    pub title: String,
    pub detail: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerPlan {
    pub summary: String,
    pub steps: Vec<PlanStep>,
    pub resources: Vec<String>,
}

pub struct AssistantService {
    gateway: Arc<LlmGateway>,
    prompts: PromptRegistry,
}

impl AssistantService {
    pub fn new(gateway: Arc<LlmGateway>, prompts: PromptRegistry) -> Self {
        Self { gateway, prompts }
    }

    pub async fn cover_letter_uk(
        &self,
        resume_text: &str,
        job_title: &str,
        job_description: &str,
    ) -> Result<String, AssistantError> {
        let resume_text = require("resume_text", resume_text, MIN_RESUME_TEXT)?;
        let job_title = require("job_title", job_title, MIN_JOB_TITLE)?;
        let job_description = require("job_description", job_description, MIN_JOB_DESCRIPTION)?;

        let template = self.prompts.load("cover_letter_uk", PROMPT_VERSION)?;
        let body = render(
            &template,
            &[
                ("resume_text", resume_text),
                ("job_title", job_title),
                ("job_description", job_description),
            ],
        );
        let request = ChatRequest::user(wrap(COVER_LETTER_RULES, &body))
            .temperature(0.6)
            .max_tokens(750);

        let response = self.gateway.call(&request).await?;
        info!(model = %response.model, cache_hit = response.cache_hit, "cover_letter_generated");
        Ok(response.text)
    }

    pub async fn mock_questions(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MockQuestions, AssistantError> {
        let resume_text = require("resume_text", resume_text, MIN_RESUME_TEXT)?;
        let job_description = require("job_description", job_description, MIN_JOB_DESCRIPTION)?;

        let template = self.prompts.load("mock_questions", PROMPT_VERSION)?;
        let body = render(
            &template,
            &[("resume_text", resume_text), ("job_description", job_description)],
        );
        let request = ChatRequest::user(wrap(MOCK_QUESTIONS_RULES, &body))
            .json_mode(true)
            .temperature(0.4)
            .max_tokens(800);

        let questions: MockQuestions = self.call_json(&request).await?;
        info!(count = questions.questions.len(), "mock_questions_generated");
        Ok(questions)
    }

    pub async fn career_advice(&self, question: &str) -> Result<CareerPlan, AssistantError> {
        let question = require("question", question, MIN_QUESTION)?;

        let template = self.prompts.load("career_advice_plan", PROMPT_VERSION)?;
        let body = render(&template, &[("question", question)]);
        let request = ChatRequest::user(wrap(CAREER_ADVICE_RULES, &body))
            .json_mode(true)
            .temperature(0.4)
            .max_tokens(700);

        let plan: CareerPlan = self.call_json(&request).await?;
        info!(steps = plan.steps.len(), "career_advice_generated");
        Ok(plan)
    }

    async fn call_json<T: DeserializeOwned>(&self, request: &ChatRequest) -> Result<T, AssistantError> {
        let response = self.gateway.call(request).await?;
        let payload = response
            .json
            .ok_or_else(|| AssistantError::InvalidOutput("no JSON payload".to_string()))?;
        serde_json::from_value(payload).map_err(|e| AssistantError::InvalidOutput(e.to_string()))
    }
}

fn require<'a>(field: &'static str, value: &'a str, min: usize) -> Result<&'a str, AssistantError> {
    let value = value.trim();
    if value.chars().count() < min {
        return Err(AssistantError::Validation { field, min });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fixtures::SAMPLE_RESUME_TEXT;
    use crate::llm_client::testing::{test_settings, ScriptedProvider};

    const JOB_DESCRIPTION: &str = "Build and operate data pipelines for a London fintech.";

    fn service(provider: &Arc<ScriptedProvider>) -> AssistantService {
        let gateway = LlmGateway::with_provider(test_settings(), provider.clone());
        AssistantService::new(Arc::new(gateway), PromptRegistry::default())
    }

    #[tokio::test]
    async fn test_cover_letter_uses_text_mode_and_uk_rules() {
        let provider = Arc::new(ScriptedProvider::new().then_ok("Dear Hiring Manager, ..."));
        let letter = service(&provider)
            .cover_letter_uk(SAMPLE_RESUME_TEXT, "  Data Engineer ", JOB_DESCRIPTION)
            .await
            .unwrap();
        assert_eq!(letter, "Dear Hiring Manager, ...");

        let sent = provider.last_request().unwrap();
        assert!(!sent.json_mode);
        assert_eq!(sent.max_tokens, 750);
        assert!((sent.temperature - 0.6).abs() < f32::EPSILON);
        let prompt = &sent.messages[0].content;
        assert!(prompt.starts_with("You are writing for a UK job application."));
        assert!(prompt.contains("role of Data Engineer."));
        assert!(prompt.contains(JOB_DESCRIPTION));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[tokio::test]
    async fn test_short_inputs_are_rejected_before_any_call() {
        let provider = Arc::new(ScriptedProvider::new().otherwise("{}"));
        let service = service(&provider);

        let result = service.cover_letter_uk(SAMPLE_RESUME_TEXT, "x", JOB_DESCRIPTION).await;
        assert!(matches!(
            result,
            Err(AssistantError::Validation { field: "job_title", min: 2 })
        ));

        let result = service.mock_questions("too short", JOB_DESCRIPTION).await;
        assert!(matches!(
            result,
            Err(AssistantError::Validation { field: "resume_text", .. })
        ));

        let result = service.career_advice("   help?    ").await;
        assert!(matches!(
            result,
            Err(AssistantError::Validation { field: "question", min: 10 })
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_questions_are_decoded() {
        let provider = Arc::new(ScriptedProvider::new().then_ok(
            r#"{"questions": [{"question": "Tell me about a pipeline you rebuilt.", "category": "behavioural",
                "rationale": "Resume mentions throughput gains", "what_good_looks_like": "STAR with numbers"}]}"#,
        ));
        let questions = service(&provider)
            .mock_questions(SAMPLE_RESUME_TEXT, JOB_DESCRIPTION)
            .await
            .unwrap();

        assert_eq!(questions.questions.len(), 1);
        assert_eq!(questions.questions[0].category, "behavioural");

        let sent = provider.last_request().unwrap();
        assert!(sent.json_mode);
        assert_eq!(sent.max_tokens, 800);
    }

    #[tokio::test]
    async fn test_career_plan_is_decoded() {
        let provider = Arc::new(ScriptedProvider::new().then_ok(
            r#"{"summary": "Move into analytics engineering", "steps": [{"title": "Learn dbt", "detail": "Finish the fundamentals course", "timeframe": "1 month"}]}"#,
        ));
        let plan = service(&provider)
            .career_advice("How do I move from data analyst to data engineer?")
            .await
            .unwrap();

        assert_eq!(plan.steps[0].title, "Learn dbt");
        assert!(plan.resources.is_empty());
        assert_eq!(provider.last_request().unwrap().max_tokens, 700);
    }

    #[tokio::test]
    async fn test_wrong_structure_is_invalid_output() {
        let provider = Arc::new(ScriptedProvider::new().then_ok(r#"{"questions": "none"}"#));
        let result = service(&provider)
            .mock_questions(SAMPLE_RESUME_TEXT, JOB_DESCRIPTION)
            .await;
        assert!(matches!(result, Err(AssistantError::InvalidOutput(_))));
    }
}
