use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{services::pipeline::PipelineError, state::palette::EditError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The pipeline API is unavailable and the operation has no local fallback.
    #[error("pipeline unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed against the current palette state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The operation crossed a soft limit and needs explicit confirmation.
    #[error("confirmation required: {0}")]
    NeedsConfirmation(String),
    /// The pipeline API rejected or failed the request after retries.
    #[error("pipeline error")]
    Upstream(#[source] PipelineError),
}

impl From<EditError> for ServiceError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::InvalidHex(_) => ServiceError::InvalidInput(err.to_string()),
            EditError::IndexOutOfRange(_) => ServiceError::NotFound(err.to_string()),
            EditError::NeedsConfirmation { .. } => ServiceError::NeedsConfirmation(err.to_string()),
            EditError::DuplicateInRole { .. }
            | EditError::RoleCapReached { .. }
            | EditError::MaxColorsReached(_)
            | EditError::WouldEmptyPalette
            | EditError::NotACoreColor(_)
            | EditError::Locked(_) => ServiceError::InvalidState(err.to_string()),
        }
    }
}

impl From<PipelineError> for ServiceError {
    fn from(err: PipelineError) -> Self {
        ServiceError::Upstream(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::NeedsConfirmation(message) => AppError::Conflict(message),
            ServiceError::Upstream(source) => AppError::ServiceUnavailable(source.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
