use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

/// Header carrying the caller's identity, set by the fronting auth layer.
pub const UPLOADER_HEADER: &str = "x-user-email";

/// Lower-cased caller identity. Every resume read and write is scoped to it.
#[derive(Debug, Clone)]
pub struct Uploader(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Uploader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(UPLOADER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Uploader(v.to_lowercase()))
            .ok_or(AppError::Unauthorized)
    }
}
