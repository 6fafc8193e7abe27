use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::core::clone::CloneError;
use crate::core::generation::GenerationError;
use crate::store::StoreError;

/// Application error type
///
/// Domain errors keep their own status and code; everything else collapses
/// into the generic variants.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Clone(#[from] CloneError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Generation(e) => e.status_code(),
            AppError::Clone(e) => e.status_code(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) | AppError::Store(_) => "internal_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Generation(e) => e.error_code(),
            AppError::Clone(e) => e.error_code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let body = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                json!({ "error": "Internal server error", "code": code })
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                json!({ "error": "Internal server error", "code": code })
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                json!({ "error": msg, "code": code })
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                json!({ "error": msg, "code": code })
            }
            AppError::Generation(e) => {
                if status.is_server_error() {
                    tracing::error!(code, "Generation failed: {}", e);
                } else {
                    tracing::warn!(code, "Generation rejected: {}", e);
                }
                match e.chunk_index() {
                    Some(index) => json!({ "error": e.to_string(), "code": code, "chunk": index }),
                    None => json!({ "error": e.to_string(), "code": code }),
                }
            }
            AppError::Clone(e) => {
                if status.is_server_error() {
                    tracing::error!(code, "Voice clone failed: {}", e);
                } else {
                    tracing::warn!(code, "Voice clone rejected: {}", e);
                }
                json!({ "ok": false, "error": e.to_string(), "code": code })
            }
        };

        (status, Json(body)).into_response()
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
