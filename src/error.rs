use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{0}")]
    InvalidPagination(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Event is at max capacity")]
    CapacityExceeded,

    #[error("Email already registered for this event")]
    DuplicateRegistration,

    #[error("Cannot register for past event")]
    EventExpired,

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn event_not_found() -> Self {
        AppError::NotFound("Event not found".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::CapacityExceeded
            | AppError::DuplicateRegistration
            | AppError::EventExpired => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidPagination(_) => "INVALID_PAGINATION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::CapacityExceeded => "CAPACITY_EXCEEDED",
            AppError::DuplicateRegistration => "DUPLICATE_REGISTRATION",
            AppError::EventExpired => "EVENT_EXPIRED",
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let body = match &self {
            AppError::Database(e) => {
                tracing::error!(error = ?e, "database error");
                ErrorBody::new("A database error occurred", code)
            }
            AppError::Validation { field, message } => {
                tracing::debug!(field = *field, %message, "validation failed");
                ErrorBody {
                    errors: Some(BTreeMap::from([(field.to_string(), vec![message.clone()])])),
                    ..ErrorBody::new(message.clone(), code)
                }
            }
            other => {
                tracing::debug!(code, message = %other, "request rejected");
                ErrorBody::new(other.to_string(), code)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body of every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
    /// Stable machine-usable reason, e.g. `CAPACITY_EXCEEDED`.
    #[schema(value_type = String)]
    pub code: &'static str,
    /// Field name to messages, present on validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
            errors: None,
        }
    }
}
