//! HTTP request handlers for the REST API.

pub mod run;
pub mod trigger;
pub mod workflow;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::http::error::AppError;

/// Deserialize a JSON request body, mapping failures to a 400.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}
