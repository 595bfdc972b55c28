//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`. Maps
//! domain errors from `dflow-core` and `dflow-workflow` to HTTP status
//! codes and a JSON error body with a machine-readable code. Internal error
//! details are never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use dflow_core::DisputeError;
use dflow_workflow::{GuardError, RenderError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
///
/// Unrecognized or terminal stage input is a 400 (the workflow endpoints'
/// documented contract); semantically invalid field content is a 422.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unrecognized or terminal workflow input (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request field content failed validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — caller lacks access to the resource (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Conflict with the resource's current state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
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

        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Terminal-record mutations conflict with the record's current state.
impl From<DisputeError> for AppError {
    fn from(err: DisputeError) -> Self {
        match &err {
            DisputeError::Terminal { .. } => Self::Conflict(err.to_string()),
        }
    }
}

/// Guard rejections conflict with the collection/record state.
impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        match &err {
            GuardError::CreationThrottled { .. } | GuardError::EscalationNotAllowed { .. } => {
                Self::Conflict(err.to_string())
            }
        }
    }
}

/// The escalation stage cannot be rendered locally.
impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match &err {
            RenderError::EscalationStage => Self::Validation(err.to_string()),
        }
    }
}
