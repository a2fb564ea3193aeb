use std::sync::Arc;

use crate::assistant::AssistantService;
use crate::resumes::ResumeService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub resumes: Arc<ResumeService>,
    pub assistant: Arc<AssistantService>,
    /// Upload size cap in bytes, checked before any parsing.
    pub max_upload_bytes: usize,
}
