use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assessment::AssessmentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Assessment(e) => assessment_error_parts(e),
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

fn assessment_error_parts(error: &AssessmentError) -> (StatusCode, &'static str, String) {
    match error {
        AssessmentError::Document(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "DOCUMENT_PARSE_ERROR",
            e.to_string(),
        ),
        AssessmentError::EmptyDocument => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "EMPTY_DOCUMENT",
            error.to_string(),
        ),
        AssessmentError::Oracle(e) => {
            tracing::error!("Oracle error: {e}");
            (
                StatusCode::BAD_GATEWAY,
                "ORACLE_ERROR",
                "The language model service could not be reached".to_string(),
            )
        }
        AssessmentError::Parse(_) | AssessmentError::MissingCategory(_) => {
            tracing::error!("Invalid oracle response: {error}");
            (
                StatusCode::BAD_GATEWAY,
                "ORACLE_RESPONSE_INVALID",
                "The language model returned an unusable response".to_string(),
            )
        }
    }
}
