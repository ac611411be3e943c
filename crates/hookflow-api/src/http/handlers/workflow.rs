//! Workflow CRUD handlers for the REST API.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use hookflow_types::workflow::{CreateWorkflowInput, UpdateWorkflowInput, Workflow};

use crate::http::error::AppError;
use crate::http::handlers::parse_json_body;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// POST /api/workflows - Create a workflow from `{ name, enabled?, steps }`.
pub async fn create_workflow(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let timer = RequestTimer::start();
    let input: CreateWorkflowInput = parse_json_body(&body)?;

    let workflow = state.workflow_service.create_workflow(input).await?;

    let self_link = format!("/api/workflows/{}", workflow.id);
    let trigger_link = workflow.trigger.path().to_string();
    let resp = timer
        .respond(workflow)
        .with_link("self", &self_link)
        .with_link("trigger", &trigger_link);

    Ok((StatusCode::CREATED, resp))
}

/// GET /api/workflows - List all workflows, newest first.
pub async fn list_workflows(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Workflow>>, AppError> {
    let timer = RequestTimer::start();
    let workflows = state.workflow_service.list_workflows().await?;
    Ok(timer.respond(workflows).with_link("self", "/api/workflows"))
}

/// GET /api/workflows/{id} - Get one workflow.
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Workflow>, AppError> {
    let timer = RequestTimer::start();
    let workflow = state.workflow_service.get_workflow(&id).await?;
    Ok(timer
        .respond(workflow)
        .with_link("runs", &format!("/api/runs/workflow/{id}")))
}

/// PUT|PATCH /api/workflows/{id} - Partial update of name, enabled, or steps.
pub async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse<Workflow>, AppError> {
    let timer = RequestTimer::start();
    let input: UpdateWorkflowInput = parse_json_body(&body)?;
    let workflow = state.workflow_service.update_workflow(&id, input).await?;
    Ok(timer.respond(workflow))
}

/// DELETE /api/workflows/{id} - Delete a workflow and its runs.
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.workflow_service.delete_workflow(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
