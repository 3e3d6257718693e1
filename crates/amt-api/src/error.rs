//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`WorkflowError`] and validation failures to HTTP status codes
//! with a JSON body carrying a machine-readable code. Internal error
//! details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use amt_engine::WorkflowError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "INVALID_TRANSITION").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or unknown caller identity (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Action refused (403). `code` separates plain denial from an
    /// impossible transition or an ineligible submission.
    #[error("forbidden: {message}")]
    Forbidden { code: &'static str, message: String },

    /// Conflict with current resource state (409).
    #[error("conflict: {message}")]
    Conflict {
        code: &'static str,
        message: String,
        retryable: bool,
    },

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: "FORBIDDEN",
            message: message.into(),
        }
    }

    fn conflict(code: &'static str, message: String) -> Self {
        Self::Conflict {
            code,
            message,
            retryable: false,
        }
    }

    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden { code, .. } => (StatusCode::FORBIDDEN, *code),
            Self::Conflict { code, .. } => (StatusCode::CONFLICT, *code),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match &self {
            Self::Conflict { retryable: true, .. } => Some(serde_json::json!({ "retryable": true })),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<amt_core::ValidationError> for AppError {
    fn from(err: amt_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match &err {
            WorkflowError::NotFound { .. } => Self::NotFound(message),
            WorkflowError::Forbidden { .. } => Self::Forbidden {
                code: "FORBIDDEN",
                message,
            },
            WorkflowError::InvalidTransition { .. } => Self::Forbidden {
                code: "INVALID_TRANSITION",
                message,
            },
            WorkflowError::Ineligible(_) => Self::Forbidden {
                code: "INELIGIBLE",
                message,
            },
            WorkflowError::Conflict { .. } => Self::Conflict {
                code: "CONFLICT",
                message,
                retryable: true,
            },
            WorkflowError::IndependenceViolation(_) => Self::conflict("INDEPENDENCE_VIOLATION", message),
            WorkflowError::DuplicateRole { .. } => Self::conflict("DUPLICATE_ROLE", message),
            WorkflowError::ExamsOfficerInvariant(_) => Self::conflict("EXAMS_OFFICER_INVARIANT", message),
            WorkflowError::DuplicateEmail(_) => Self::conflict("DUPLICATE_EMAIL", message),
            WorkflowError::Validation(_) => Self::Validation(message),
        }
    }
}
