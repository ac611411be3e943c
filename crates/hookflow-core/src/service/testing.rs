//! In-memory repository used by service tests.

use std::sync::{Arc, Mutex};

use hookflow_types::error::RepositoryError;
use hookflow_types::workflow::{Workflow, WorkflowRun};

use crate::repository::run::RunRepository;
use crate::repository::workflow::WorkflowRepository;

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    workflows: Arc<Mutex<Vec<Workflow>>>,
    runs: Arc<Mutex<Vec<WorkflowRun>>>,
}

impl MemoryStore {
    pub(crate) fn runs(&self) -> Vec<WorkflowRun> {
        self.runs.lock().unwrap().clone()
    }
}

impl WorkflowRepository for MemoryStore {
    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let mut workflows = self.workflows.lock().unwrap();
        if workflows
            .iter()
            .any(|w| w.id != workflow.id && w.trigger.path() == workflow.trigger.path())
        {
            return Err(RepositoryError::Conflict(workflow.trigger.path().to_string()));
        }
        match workflows.iter_mut().find(|w| w.id == workflow.id) {
            Some(existing) => *existing = workflow.clone(),
            None => workflows.push(workflow.clone()),
        }
        Ok(())
    }

    async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>, RepositoryError> {
        Ok(self.workflows.lock().unwrap().iter().find(|w| w.id == id).cloned())
    }

    async fn get_workflow_by_trigger_path(
        &self,
        path: &str,
    ) -> Result<Option<Workflow>, RepositoryError> {
        Ok(self
            .workflows
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.trigger.path() == path)
            .cloned())
    }

    async fn list_workflows(&self) -> Result<Vec<Workflow>, RepositoryError> {
        Ok(self.workflows.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn delete_workflow(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut workflows = self.workflows.lock().unwrap();
        let before = workflows.len();
        workflows.retain(|w| w.id != id);
        let deleted = workflows.len() != before;
        if deleted {
            self.runs.lock().unwrap().retain(|r| r.workflow_id != id);
        }
        Ok(deleted)
    }
}

impl RunRepository for MemoryStore {
    async fn create_run(&self, run: &WorkflowRun) -> Result<(), RepositoryError> {
        self.runs.lock().unwrap().push(run.clone());
        Ok(())
    }

    async fn get_run(&self, id: &str) -> Result<Option<WorkflowRun>, RepositoryError> {
        Ok(self.runs.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list_runs(
        &self,
        workflow_id: &str,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, RepositoryError> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.workflow_id == workflow_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
