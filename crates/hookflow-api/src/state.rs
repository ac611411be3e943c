//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/transport traits, but AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use hookflow_core::service::run::RunService;
use hookflow_core::service::trigger::TriggerService;
use hookflow_core::service::workflow::WorkflowService;
use hookflow_infra::http::transport::ReqwestTransport;
use hookflow_infra::sqlite::pool::{database_url_for, DatabasePool};
use hookflow_infra::sqlite::workflow::SqliteWorkflowRepository;
use hookflow_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteWorkflowService = WorkflowService<SqliteWorkflowRepository>;

pub type ConcreteRunService = RunService<SqliteWorkflowRepository>;

pub type ConcreteTriggerService =
    TriggerService<SqliteWorkflowRepository, SqliteWorkflowRepository, ReqwestTransport>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub workflow_service: Arc<ConcreteWorkflowService>,
    pub run_service: Arc<ConcreteRunService>,
    pub trigger_service: Arc<ConcreteTriggerService>,
    pub web_dir: Option<PathBuf>,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(data_dir: &std::path::Path, config: &GlobalConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let db_url = config
            .database_url
            .clone()
            .unwrap_or_else(|| database_url_for(data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;
        let transport = ReqwestTransport::new(&config.http.user_agent)?;

        let mut state = Self::from_parts(db_pool, transport);
        state.web_dir = config.web_dir.as_ref().map(PathBuf::from);
        Ok(state)
    }

    /// Wire services over an open pool and transport.
    pub fn from_parts(db_pool: DatabasePool, transport: ReqwestTransport) -> Self {
        let repo = SqliteWorkflowRepository::new(db_pool);

        Self {
            workflow_service: Arc::new(WorkflowService::new(repo.clone())),
            run_service: Arc::new(RunService::new(repo.clone())),
            trigger_service: Arc::new(TriggerService::new(repo.clone(), repo, transport)),
            web_dir: None,
        }
    }
}
