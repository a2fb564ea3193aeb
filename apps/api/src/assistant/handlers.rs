use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CareerPlan, MockQuestions};
use crate::errors::AppError;
use crate::routes::identity::Uploader;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_id: Uuid,
    pub job_title: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct MockQuestionsRequest {
    pub resume_id: Uuid,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct CareerAdviceRequest {
    pub question: String,
}

/// Source text of a stored upload owned by the caller.
async fn stored_resume_text(state: &AppState, id: Uuid, uploader: &str) -> Result<String, AppError> {
    state
        .resumes
        .get_resume(id, uploader)
        .await?
        .map(|row| row.raw_text)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

/// POST /api/v1/ai/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Uploader(uploader): Uploader,
    Json(req): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let resume_text = stored_resume_text(&state, req.resume_id, &uploader).await?;
    let cover_letter = state
        .assistant
        .cover_letter_uk(&resume_text, &req.job_title, &req.job_description)
        .await?;
    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// POST /api/v1/ai/mock-questions
pub async fn handle_mock_questions(
    State(state): State<AppState>,
    Uploader(uploader): Uploader,
    Json(req): Json<MockQuestionsRequest>,
) -> Result<Json<MockQuestions>, AppError> {
    let resume_text = stored_resume_text(&state, req.resume_id, &uploader).await?;
    let questions = state
        .assistant
        .mock_questions(&resume_text, &req.job_description)
        .await?;
    Ok(Json(questions))
}

/// POST /api/v1/ai/career-advice
pub async fn handle_career_advice(
    State(state): State<AppState>,
    Uploader(_): Uploader,
    Json(req): Json<CareerAdviceRequest>,
) -> Result<Json<CareerPlan>, AppError> {
    Ok(Json(state.assistant.career_advice(&req.question).await?))
}
