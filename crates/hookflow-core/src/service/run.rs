//! Run record service.

use chrono::{DateTime, Utc};
use hookflow_types::error::RepositoryError;
use hookflow_types::workflow::{RunOutcome, WorkflowRun};
use uuid::Uuid;

use crate::repository::run::RunRepository;

/// Default number of runs returned by `list_runs`.
pub const DEFAULT_RUN_LIMIT: u32 = 50;

/// Generate a run id: `run_` followed by 32 hex characters.
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::now_v7().simple())
}

/// Persists finished runs and reads run history.
pub struct RunService<R: RunRepository> {
    repo: R,
}

impl<R: RunRepository> RunService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Store the outcome of a finished run.
    pub async fn record_run(
        &self,
        workflow_id: &str,
        outcome: RunOutcome,
        started_at: DateTime<Utc>,
    ) -> Result<WorkflowRun, RepositoryError> {
        let run = WorkflowRun {
            id: generate_run_id(),
            workflow_id: workflow_id.to_string(),
            status: outcome.status,
            context: outcome.context,
            error_message: outcome.error,
            error_details: outcome.error_details,
            started_at,
            completed_at: Some(Utc::now()),
        };
        self.repo.create_run(&run).await?;
        tracing::debug!(
            run_id = %run.id,
            workflow_id = %workflow_id,
            status = %run.status,
            "run recorded"
        );
        Ok(run)
    }

    pub async fn get_run(&self, id: &str) -> Result<Option<WorkflowRun>, RepositoryError> {
        self.repo.get_run(id).await
    }

    /// Runs of a workflow, newest first.
    pub async fn list_runs(
        &self,
        workflow_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<WorkflowRun>, RepositoryError> {
        self.repo
            .list_runs(workflow_id, limit.unwrap_or(DEFAULT_RUN_LIMIT))
            .await
    }
}
