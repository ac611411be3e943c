//! Run history handlers for the REST API.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use hookflow_types::workflow::WorkflowRun;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Query parameters for listing runs.
#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    /// Maximum number of runs to return (service default when absent).
    pub limit: Option<u32>,
}

/// GET /api/runs/workflow/{workflow_id} - Runs of a workflow, newest first.
pub async fn list_runs(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Query(query): Query<ListRunsQuery>,
) -> Result<ApiResponse<Vec<WorkflowRun>>, AppError> {
    let timer = RequestTimer::start();
    let runs = state.run_service.list_runs(&workflow_id, query.limit).await?;
    Ok(timer
        .respond(runs)
        .with_link("workflow", &format!("/api/workflows/{workflow_id}")))
}

/// GET /api/runs/{id} - One run record.
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<WorkflowRun>, AppError> {
    let timer = RequestTimer::start();
    let run = state
        .run_service
        .get_run(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Run '{id}' not found")))?;
    Ok(timer.respond(run))
}
