use thiserror::Error;
use uuid::Uuid;

use anamnesis_bedrock::error::GatewayError;
use anamnesis_core::models::session::{FailureKind, SessionFailure};
use anamnesis_core::schema::ResponseKind;
use anamnesis_storage::StorageError;

#[derive(Debug, Error)]
pub enum InterviewError {
    /// Rejected before any model call; the session is untouched.
    #[error("invalid request: {0}")]
    RequestValidation(String),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("model gateway error{}: {message}", status_suffix(.status))]
    Gateway { status: Option<u16>, message: String },

    #[error("model output could not be decoded: {message}")]
    Decode { message: String, raw: Option<String> },

    #[error("model output matched no known shape: {reason}")]
    SchemaViolation { reason: String, payload: String },

    #[error("expected {}, model returned {found}", expected_list(.expected))]
    UnexpectedType {
        expected: Vec<ResponseKind>,
        found: ResponseKind,
        payload: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl InterviewError {
    /// The failure kind recorded on the session, for errors that fail it.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Gateway { .. } => Some(FailureKind::Gateway),
            Self::Decode { .. } => Some(FailureKind::Decode),
            Self::SchemaViolation { .. } => Some(FailureKind::SchemaViolation),
            Self::UnexpectedType { .. } => Some(FailureKind::UnexpectedType),
            Self::RequestValidation(_) | Self::SessionNotFound(_) | Self::Storage(_) => None,
        }
    }

    /// The offending model output, when there is one.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Decode { raw, .. } => raw.as_deref(),
            Self::SchemaViolation { payload, .. } | Self::UnexpectedType { payload, .. } => {
                Some(payload)
            }
            _ => None,
        }
    }

    pub fn to_failure(&self) -> Option<SessionFailure> {
        self.failure_kind().map(|kind| SessionFailure {
            kind,
            message: self.to_string(),
            payload: self.payload().map(str::to_string),
        })
    }
}

impl From<GatewayError> for InterviewError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Provider { status, message } => Self::Gateway { status, message },
            GatewayError::EmptyContent => Self::Decode {
                message: "model returned no content".to_string(),
                raw: None,
            },
            GatewayError::Decode { message, raw } => Self::Decode {
                message,
                raw: Some(raw),
            },
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

fn expected_list(expected: &[ResponseKind]) -> String {
    expected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}
