//! Trigger handling: resolve a trigger path, run the workflow, record the run.

use chrono::Utc;
use hookflow_types::error::RepositoryError;
use hookflow_types::workflow::{RunStatus, Workflow, WorkflowRun};
use serde_json::Value;

use crate::repository::run::RunRepository;
use crate::repository::workflow::WorkflowRepository;
use crate::service::run::RunService;
use crate::workflow::context::{context_from_payload, ContextError};
use crate::workflow::dispatcher::HttpTransport;
use crate::workflow::executor::WorkflowRunner;

/// Errors that stop a trigger before (or while recording) a run.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Workflow not found")]
    NotFound,

    #[error("Workflow is disabled")]
    Disabled,

    #[error(transparent)]
    InvalidPayload(#[from] ContextError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Runs workflows in response to trigger requests.
pub struct TriggerService<W: WorkflowRepository, R: RunRepository, T: HttpTransport> {
    workflows: W,
    runs: RunService<R>,
    runner: WorkflowRunner<T>,
}

impl<W: WorkflowRepository, R: RunRepository, T: HttpTransport> TriggerService<W, R, T> {
    pub fn new(workflows: W, runs: R, transport: T) -> Self {
        Self {
            workflows,
            runs: RunService::new(runs),
            runner: WorkflowRunner::new(transport),
        }
    }

    /// Find the enabled workflow listening on `path`.
    pub async fn resolve(&self, path: &str) -> Result<Workflow, TriggerError> {
        let workflow = self
            .workflows
            .get_workflow_by_trigger_path(path)
            .await?
            .ok_or(TriggerError::NotFound)?;
        if !workflow.enabled {
            return Err(TriggerError::Disabled);
        }
        Ok(workflow)
    }

    /// Run `workflow` with `payload` as the initial context and record the run.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        payload: Option<Value>,
    ) -> Result<WorkflowRun, TriggerError> {
        let initial = context_from_payload(payload)?;
        let started_at = Utc::now();
        let outcome = self
            .runner
            .execute_workflow(&workflow.steps, &initial, &workflow.id)
            .await;
        Ok(self.runs.record_run(&workflow.id, outcome, started_at).await?)
    }

    /// Resolve `path` and execute its workflow.
    pub async fn handle(
        &self,
        path: &str,
        payload: Option<Value>,
    ) -> Result<WorkflowRun, TriggerError> {
        let workflow = self.resolve(path).await?;
        let run = self.execute(&workflow, payload).await?;
        if run.status == RunStatus::Failed {
            tracing::warn!(run_id = %run.id, trigger_path = %path, "triggered run failed");
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::run::RunRepository;
    use crate::service::testing::MemoryStore;
    use crate::service::workflow::WorkflowService;
    use crate::workflow::dispatcher::tests::FakeTransport;
    use hookflow_types::workflow::{CreateWorkflowInput, UpdateWorkflowInput};
    use serde_json::json;

    async fn setup(
        steps: Value,
    ) -> (
        MemoryStore,
        Workflow,
        TriggerService<MemoryStore, MemoryStore, FakeTransport>,
    ) {
        let store = MemoryStore::default();
        let input: CreateWorkflowInput =
            serde_json::from_value(json!({ "name": "wf", "steps": steps })).unwrap();
        let workflow = WorkflowService::new(store.clone())
            .create_workflow(input)
            .await
            .unwrap();
        let trigger = TriggerService::new(store.clone(), store.clone(), FakeTransport::default());
        (store, workflow, trigger)
    }

    #[tokio::test]
    async fn test_handle_runs_and_records() {
        let (store, workflow, trigger) = setup(json!([
            { "type": "transform", "ops": [{ "op": "default", "path": "message", "value": "hi" }] }
        ]))
        .await;

        let run = trigger
            .handle(workflow.trigger.path(), Some(json!({ "a": 1 })))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Success);
        assert_eq!(Value::Object(run.context.clone()), json!({ "a": 1, "message": "hi" }));
        assert_eq!(store.runs(), vec![run.clone()]);
        assert_eq!(store.list_runs(&workflow.id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_finds_workflow_by_trigger_path() {
        let (_, workflow, trigger) = setup(json!([{ "type": "transform", "ops": [] }])).await;
        let resolved = trigger.resolve(workflow.trigger.path()).await.unwrap();
        assert_eq!(resolved, workflow);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (store, _, trigger) = setup(json!([{ "type": "transform", "ops": [] }])).await;
        assert!(matches!(
            trigger.handle("/t/unknown", None).await,
            Err(TriggerError::NotFound)
        ));
        assert!(store.runs().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_workflow_is_rejected() {
        let (store, workflow, trigger) = setup(json!([{ "type": "transform", "ops": [] }])).await;
        WorkflowService::new(store.clone())
            .update_workflow(
                &workflow.id,
                UpdateWorkflowInput {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            trigger.handle(workflow.trigger.path(), None).await,
            Err(TriggerError::Disabled)
        ));
        assert!(store.runs().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_payload_is_rejected_before_run() {
        let (store, workflow, trigger) = setup(json!([{ "type": "transform", "ops": [] }])).await;
        let err = trigger
            .handle(workflow.trigger.path(), Some(json!("text")))
            .await
            .unwrap_err();
        assert!(matches!(err, TriggerError::InvalidPayload(_)));
        assert!(store.runs().is_empty());
    }

    #[tokio::test]
    async fn test_null_payload_is_empty_context() {
        let (_, workflow, trigger) = setup(json!([{ "type": "transform", "ops": [] }])).await;
        let run = trigger
            .handle(workflow.trigger.path(), Some(Value::Null))
            .await
            .unwrap();
        assert!(run.context.is_empty());
    }

    #[tokio::test]
    async fn test_failed_run_is_recorded() {
        let (store, workflow, trigger) = setup(json!([
            { "type": "transform", "ops": [{ "op": "template", "to": "x" }] }
        ]))
        .await;

        let run = trigger.handle(workflow.trigger.path(), None).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error_message.is_some());
        assert!(run.error_details.is_some());
        assert_eq!(store.runs().len(), 1);
    }
}
