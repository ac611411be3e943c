//! Trigger endpoint: `POST /t/{*path}` starts a workflow run.
//!
//! The run executes on its own task so a client disconnect does not abort
//! it; the handler awaits the task and maps the run status to the response.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use hookflow_types::workflow::RunStatus;

use crate::http::error::AppError;
use crate::state::AppState;

/// Parse a trigger body. An empty body is an absent payload.
fn parse_payload(body: &Bytes) -> Result<Option<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

/// POST /t/{*path} - Run the workflow bound to this trigger path.
///
/// - `success` / `skipped` runs answer 200 with `{ "status": ... }`.
/// - `failed` runs answer 500 with `{ "status": "failed", "error": ... }`.
pub async fn trigger_workflow(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let trigger_path = format!("/t/{path}");
    let payload = parse_payload(&body)?;

    let trigger = Arc::clone(&state.trigger_service);
    let task_path = trigger_path.clone();
    let run = tokio::spawn(async move { trigger.handle(&task_path, payload).await })
        .await
        .map_err(|e| AppError::Internal(format!("run task failed: {e}")))??;

    tracing::info!(
        trigger_path = %trigger_path,
        workflow_id = %run.workflow_id,
        run_id = %run.id,
        status = %run.status,
        "trigger handled"
    );

    let response = match run.status {
        RunStatus::Success | RunStatus::Skipped => (
            StatusCode::OK,
            Json(json!({ "status": run.status, "run_id": run.id })),
        ),
        RunStatus::Failed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": run.status,
                "run_id": run.id,
                "error": run.error_message,
            })),
        ),
    };
    Ok(response)
}
