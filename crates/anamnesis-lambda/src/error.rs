use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use anamnesis_core::models::session::FailureKind;
use anamnesis_interview::InterviewError;
use anamnesis_storage::StorageError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// Another action holds the orchestrator.
    Busy,
    /// The model round trip failed; the active session is now failed.
    Model {
        kind: FailureKind,
        message: String,
        payload: Option<String>,
    },
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::message(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::message(msg)),
            ApiError::Busy => (
                StatusCode::CONFLICT,
                ErrorBody::message("another action is in progress".to_string()),
            ),
            ApiError::Model {
                kind,
                message,
                payload,
            } => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: message,
                    kind: Some(kind),
                    payload,
                },
            ),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("internal server error".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl ErrorBody {
    fn message(error: String) -> Self {
        Self {
            error,
            kind: None,
            payload: None,
        }
    }
}

impl From<InterviewError> for ApiError {
    fn from(e: InterviewError) -> Self {
        if let Some(failure) = e.to_failure() {
            return ApiError::Model {
                kind: failure.kind,
                message: failure.message,
                payload: failure.payload,
            };
        }
        match e {
            InterviewError::RequestValidation(msg) => ApiError::BadRequest(msg),
            InterviewError::SessionNotFound(id) => {
                ApiError::NotFound(format!("session not found: {id}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
