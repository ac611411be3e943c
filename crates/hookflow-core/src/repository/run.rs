//! Run record repository trait.

use hookflow_types::error::RepositoryError;
use hookflow_types::workflow::WorkflowRun;

/// Repository trait for workflow run records.
///
/// Runs are written once, after the run has finished.
pub trait RunRepository: Send + Sync {
    /// Insert a run record.
    fn create_run(
        &self,
        run: &WorkflowRun,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a run by its ID.
    fn get_run(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<WorkflowRun>, RepositoryError>> + Send;

    /// List runs of a workflow, newest first, at most `limit` entries.
    fn list_runs(
        &self,
        workflow_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<WorkflowRun>, RepositoryError>> + Send;
}
