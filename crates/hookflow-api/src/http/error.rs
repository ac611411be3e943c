//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use hookflow_core::service::trigger::TriggerError;
use hookflow_core::service::workflow::WorkflowServiceError;
use hookflow_core::workflow::definition::DefinitionError;
use hookflow_types::error::RepositoryError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request or invalid workflow definition.
    Validation(String),
    /// The target exists but refuses the request (disabled workflow).
    Forbidden(String),
    /// Unknown workflow, run, or trigger path.
    NotFound(String),
    /// Unique constraint violation.
    Conflict(String),
    /// Generic internal error.
    Internal(String),
}

impl From<WorkflowServiceError> for AppError {
    fn from(e: WorkflowServiceError) -> Self {
        match e {
            WorkflowServiceError::NotFound(id) => {
                AppError::NotFound(format!("Workflow '{id}' not found"))
            }
            WorkflowServiceError::Definition(e) => e.into(),
            WorkflowServiceError::Repository(e) => e.into(),
        }
    }
}

impl From<DefinitionError> for AppError {
    fn from(e: DefinitionError) -> Self {
        match e {
            DefinitionError::Parse(msg) | DefinitionError::Validation(msg) => {
                AppError::Validation(msg)
            }
            DefinitionError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TriggerError> for AppError {
    fn from(e: TriggerError) -> Self {
        match e {
            TriggerError::NotFound => AppError::NotFound(e.to_string()),
            TriggerError::Disabled => AppError::Forbidden(e.to_string()),
            TriggerError::InvalidPayload(inner) => AppError::Validation(inner.to_string()),
            TriggerError::Repository(inner) => inner.into(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("Entity not found".to_string()),
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, message, "request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
