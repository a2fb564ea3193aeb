// Career assistant: cover letters, mock interview questions and career plans.
// All model calls go through the shared LlmGateway.

pub mod handlers;
pub mod prompts;
pub mod service;

pub use service::{AssistantError, AssistantService, CareerPlan, MockQuestions};
