//! Workflow definition management service.
//!
//! Validates definitions, assigns ids and trigger paths on create, and merges
//! partial updates before writing through `WorkflowRepository`.

use hookflow_types::error::RepositoryError;
use hookflow_types::workflow::{CreateWorkflowInput, Trigger, UpdateWorkflowInput, Workflow};
use uuid::Uuid;

use crate::repository::workflow::WorkflowRepository;
use crate::workflow::definition::{
    validate_definition, validate_name, validate_steps, DefinitionError,
};

/// Errors returned by `WorkflowService`.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowServiceError {
    #[error("workflow not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Generate a workflow id: `wf_` followed by 32 hex characters.
pub fn generate_workflow_id() -> String {
    format!("wf_{}", Uuid::now_v7().simple())
}

/// Generate an unguessable trigger path: `/t/` followed by 32 hex characters.
pub fn generate_trigger_path() -> String {
    format!("/t/{}", Uuid::new_v4().simple())
}

/// Service for workflow CRUD.
///
/// Generic over `R: WorkflowRepository` -- hookflow-core never depends on
/// hookflow-infra.
pub struct WorkflowService<R: WorkflowRepository> {
    repo: R,
}

impl<R: WorkflowRepository> WorkflowService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validate and store a new workflow with a fresh id and trigger path.
    pub async fn create_workflow(
        &self,
        input: CreateWorkflowInput,
    ) -> Result<Workflow, WorkflowServiceError> {
        validate_definition(&input)?;

        let workflow = Workflow {
            id: generate_workflow_id(),
            name: input.name,
            enabled: input.enabled,
            trigger: Trigger::Http {
                path: generate_trigger_path(),
            },
            steps: input.steps,
        };

        self.repo.save_workflow(&workflow).await?;
        tracing::info!(
            workflow_id = %workflow.id,
            trigger_path = %workflow.trigger.path(),
            steps = workflow.steps.len(),
            "workflow created"
        );
        Ok(workflow)
    }

    /// Get a workflow by id.
    pub async fn get_workflow(&self, id: &str) -> Result<Workflow, WorkflowServiceError> {
        self.repo
            .get_workflow(id)
            .await?
            .ok_or_else(|| WorkflowServiceError::NotFound(id.to_string()))
    }

    /// List all workflows, newest first.
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, WorkflowServiceError> {
        Ok(self.repo.list_workflows().await?)
    }

    /// Apply a partial update. Id and trigger path never change.
    pub async fn update_workflow(
        &self,
        id: &str,
        input: UpdateWorkflowInput,
    ) -> Result<Workflow, WorkflowServiceError> {
        let mut workflow = self.get_workflow(id).await?;

        if let Some(name) = input.name {
            validate_name(&name)?;
            workflow.name = name;
        }
        if let Some(enabled) = input.enabled {
            workflow.enabled = enabled;
        }
        if let Some(steps) = input.steps {
            validate_steps(&steps)?;
            workflow.steps = steps;
        }

        self.repo.save_workflow(&workflow).await?;
        tracing::info!(workflow_id = %workflow.id, enabled = workflow.enabled, "workflow updated");
        Ok(workflow)
    }

    /// Delete a workflow and its run history.
    pub async fn delete_workflow(&self, id: &str) -> Result<(), WorkflowServiceError> {
        if !self.repo.delete_workflow(id).await? {
            return Err(WorkflowServiceError::NotFound(id.to_string()));
        }
        tracing::info!(workflow_id = %id, "workflow deleted");
        Ok(())
    }
}
