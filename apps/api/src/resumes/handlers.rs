use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::documents::UploadedDocument;
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummary};
use crate::routes::identity::Uploader;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "resume";

#[derive(Serialize)]
pub struct UploadResponse {
    pub resume_id: Uuid,
}

/// POST /api/v1/resumes
pub async fn handle_upload(
    State(state): State<AppState>,
    Uploader(uploader): Uploader,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let document = read_upload(&mut multipart, state.max_upload_bytes).await?;
    if !document.is_allowed() {
        return Err(AppError::Validation("Unsupported file format".to_string()));
    }

    let resume_id = state.resumes.ingest_and_analyze(&document, &uploader).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { resume_id })))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Uploader(uploader): Uploader,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let rows = state.resumes.list_uploads(&uploader).await?;
    Ok(Json(rows.iter().map(ResumeSummary::from).collect()))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Uploader(uploader): Uploader,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    state
        .resumes
        .get_resume(id, &uploader)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

async fn read_upload(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadedDocument, AppError> {
    let too_large = || AppError::PayloadTooLarge(format!("File too large (max {}MB)", max_bytes / (1024 * 1024)));
    let rejected = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            AppError::Validation(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(rejected)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(rejected)?;
        if bytes.len() > max_bytes {
            return Err(too_large());
        }
        return Ok(UploadedDocument::new(file_name, bytes));
    }

    Err(AppError::Validation(format!(
        "Missing multipart field '{UPLOAD_FIELD}'"
    )))
}
