use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::import::ImportError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Import(e) => import_status(e),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn import_status(error: &ImportError) -> (StatusCode, &'static str, String) {
    match error {
        ImportError::ConsentRequired => (
            StatusCode::FORBIDDEN,
            "CONSENT_REQUIRED",
            "Consent is required before sending documents to the AI service".to_string(),
        ),
        ImportError::Busy => (
            StatusCode::CONFLICT,
            "IMPORT_IN_PROGRESS",
            error.to_string(),
        ),
        ImportError::Dismissed => (StatusCode::CONFLICT, "IMPORT_DISMISSED", error.to_string()),
        ImportError::MissingCredentials => {
            tracing::error!("AI import attempted without GEMINI_API_KEY");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI_UNAVAILABLE",
                "AI import is not configured".to_string(),
            )
        }
        ImportError::Parse(e) => {
            tracing::warn!("Import parse error: {e}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                "The file could not be read as CV data".to_string(),
            )
        }
        ImportError::Http(_)
        | ImportError::Api { .. }
        | ImportError::RateLimited { .. }
        | ImportError::EmptyResponse => {
            tracing::error!("Extraction error: {error}");
            (
                StatusCode::BAD_GATEWAY,
                "EXTRACTION_ERROR",
                "Failed to parse file with AI".to_string(),
            )
        }
    }
}
