//! Unified error handling for the builder API.
//!
//! Every error renders as the JSON envelope with `ok: false`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use neat_bundle_core::MAX_STEPS_PER_BUNDLE;

use crate::db::{RepositoryError, SequencerError};
use crate::models::{FieldError, JsonEnvelope};

/// Application-level error type for the builder API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// A multi-statement change was rolled back.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Submitted data failed field validation.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The bundle already holds the maximum number of steps.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// A call to the commerce platform failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Merchant identity is missing or malformed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("resource".to_string()),
            other => Self::Database(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<SequencerError> for AppError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::BundleNotFound(id) => Self::NotFound(format!("bundle {id}")),
            SequencerError::StepNotFound { step_number, .. } => {
                Self::NotFound(format!("step {step_number}"))
            }
            SequencerError::LimitExceeded { max } => {
                Self::LimitExceeded(format!("a bundle can have at most {max} steps"))
            }
            SequencerError::Repository(RepositoryError::NotFound) => {
                Self::NotFound("resource".to_string())
            }
            other => Self::Transaction(other.to_string()),
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Transaction(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::LimitExceeded(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Transaction(_) | Self::Upstream(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Builder request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let envelope = match self {
            Self::Database(_) | Self::Transaction(_) | Self::Internal(_) => {
                JsonEnvelope::<()>::error("Internal server error", Vec::new())
            }
            Self::Upstream(_) => JsonEnvelope::error("Upstream service error", Vec::new()),
            Self::Validation(errors) => JsonEnvelope::error("Validation failed", errors),
            Self::LimitExceeded(message) => JsonEnvelope::error(
                message,
                vec![FieldError::new(
                    "stepsLength",
                    "Steps",
                    format!("You can't have more than {MAX_STEPS_PER_BUNDLE} steps in a bundle."),
                )],
            ),
            other => JsonEnvelope::error(other.to_string(), Vec::new()),
        };

        (status, Json(envelope)).into_response()
    }
}
