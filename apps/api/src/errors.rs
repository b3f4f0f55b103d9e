use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::allocation::sweep::MalformedInterval;
use crate::matching::validator::ConstraintViolation;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Catalog constraint violated: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("Malformed allocation interval: {0}")]
    MalformedInterval(#[from] MalformedInterval),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Constraint(violation) => {
                let (status, code) = match violation {
                    ConstraintViolation::NotFound { .. } => {
                        (StatusCode::NOT_FOUND, "TAXONOMY_NOT_FOUND")
                    }
                    ConstraintViolation::ScopeMismatch { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "SCOPE_MISMATCH")
                    }
                    ConstraintViolation::DuplicatePrimary { .. } => {
                        (StatusCode::CONFLICT, "DUPLICATE_PRIMARY")
                    }
                };
                (
                    status,
                    code,
                    violation.to_string(),
                    serde_json::to_value(violation).ok(),
                )
            }
            AppError::MalformedInterval(e) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_INTERVAL",
                e.to_string(),
                serde_json::to_value(e).ok(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
