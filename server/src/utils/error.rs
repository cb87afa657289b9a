use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Registration {registration_id} is already checked in")]
    DuplicateCheckIn { registration_id: Uuid },

    #[error("Event {event_id} cannot take {requested} more attendee(s), {remaining} remaining")]
    CapacityExceeded {
        event_id: Uuid,
        requested: i32,
        remaining: i64,
    },

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Database unavailable")]
    Unavailable(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::DuplicateCheckIn { .. }
            | AppError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            AppError::InvalidRegistration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DuplicateCheckIn { .. } => "DUPLICATE_CHECK_IN",
            AppError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            AppError::InvalidRegistration(_) => "INVALID_REGISTRATION",
            AppError::Unavailable(_) => "UNAVAILABLE",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// True for every outcome an operator should read as "already done".
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AppError::Conflict(_) | AppError::DuplicateCheckIn { .. }
        )
    }

    fn log(&self) {
        match self {
            AppError::Unavailable(e) => {
                error!(error = ?e, "Database unavailable");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal error");
            }
            // Caller mistakes are recoverable, keep them out of the error stream.
            _ => {
                warn!(code = self.code(), message = %self, "Request rejected");
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::DuplicateCheckIn { registration_id } => {
                Some(json!({ "registration_id": registration_id }))
            }
            AppError::CapacityExceeded {
                event_id,
                requested,
                remaining,
            } => Some(json!({
                "event_id": event_id,
                "requested": requested,
                "remaining": remaining,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidRegistration(msg) => msg.clone(),
            AppError::DuplicateCheckIn { .. } | AppError::CapacityExceeded { .. } => {
                self.to_string()
            }
            AppError::Unavailable(_) => "The database is currently unavailable".to_string(),
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
        };

        error_response(code, public_message, self.details(), status)
    }
}
