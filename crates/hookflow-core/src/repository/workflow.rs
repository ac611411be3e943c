//! Workflow definition repository trait.

use hookflow_types::error::RepositoryError;
use hookflow_types::workflow::Workflow;

/// Repository trait for workflow definitions.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait WorkflowRepository: Send + Sync {
    /// Upsert a workflow (insert or replace by ID).
    ///
    /// Returns `RepositoryError::Conflict` if another workflow already owns
    /// the trigger path.
    fn save_workflow(
        &self,
        workflow: &Workflow,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a workflow by its ID.
    fn get_workflow(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Workflow>, RepositoryError>> + Send;

    /// Get the workflow listening on a trigger path (e.g. `/t/3f9a...`).
    fn get_workflow_by_trigger_path(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Workflow>, RepositoryError>> + Send;

    /// List all workflows, newest first.
    fn list_workflows(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Workflow>, RepositoryError>> + Send;

    /// Delete a workflow and its runs. Returns `true` if it existed.
    fn delete_workflow(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
