//! CLI workflow management subcommands.
//!
//! Provides create, list, runs, and delete operations against the stored
//! workflows and their run history.

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use hookflow_core::service::workflow::WorkflowServiceError;
use hookflow_types::workflow::{RunStatus, WorkflowRun};

use crate::cli::definition;
use crate::state::AppState;

/// Workflow management subcommands.
#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Create (register) a workflow from a JSON or YAML file.
    Create {
        /// Path to the definition file.
        file: PathBuf,
    },

    /// List registered workflows.
    #[command(alias = "ls")]
    List,

    /// Show recent runs of a workflow.
    Runs {
        /// Workflow id.
        id: String,

        /// Maximum number of runs to display.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Delete a workflow and its run history.
    #[command(alias = "rm")]
    Delete {
        /// Workflow id.
        id: String,
    },
}

/// Handle a workflow subcommand.
pub async fn handle_workflow_command(
    cmd: WorkflowCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        WorkflowCommand::Create { file } => handle_create(&file, state, json).await,
        WorkflowCommand::List => handle_list(state, json).await,
        WorkflowCommand::Runs { id, limit } => handle_runs(&id, limit, state, json).await,
        WorkflowCommand::Delete { id } => handle_delete(&id, state, json).await,
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

async fn handle_create(file: &PathBuf, state: &AppState, json: bool) -> Result<()> {
    let def = definition::load(file)?;
    let workflow = state
        .workflow_service
        .create_workflow(def)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to save workflow: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workflow)?);
    } else {
        println!();
        println!(
            "  {} Created workflow '{}'",
            style("*").green().bold(),
            style(&workflow.name).cyan()
        );
        println!("  ID: {}", workflow.id);
        println!("  Steps: {}", workflow.steps.len());
        println!("  Trigger: POST {}", style(workflow.trigger.path()).yellow());
        println!();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

async fn handle_list(state: &AppState, json: bool) -> Result<()> {
    let workflows = state
        .workflow_service
        .list_workflows()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list workflows: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workflows)?);
        return Ok(());
    }

    if workflows.is_empty() {
        println!();
        println!("  No workflows registered.");
        println!(
            "  Create one with: {}",
            style("hookflow workflow create <file.yaml>").dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name"),
            Cell::new("Enabled"),
            Cell::new("Steps"),
            Cell::new("Trigger"),
        ]);

    for wf in &workflows {
        let enabled = if wf.enabled {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&wf.id),
            Cell::new(&wf.name),
            enabled,
            Cell::new(wf.steps.len()),
            Cell::new(wf.trigger.path()),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

async fn handle_runs(id: &str, limit: Option<u32>, state: &AppState, json: bool) -> Result<()> {
    let workflow = state.workflow_service.get_workflow(id).await.map_err(|e| match e {
        WorkflowServiceError::NotFound(_) => anyhow::anyhow!("No workflow found with id '{id}'"),
        other => anyhow::anyhow!("Failed to look up workflow: {other}"),
    })?;

    let runs = state
        .run_service
        .list_runs(&workflow.id, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list runs: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!();
        println!("  No runs for workflow '{}'.", workflow.name);
        println!();
        return Ok(());
    }

    println!();
    println!("  Runs for workflow '{}'", style(&workflow.name).cyan());
    println!();
    println!("{}", runs_table(&runs));
    println!();

    Ok(())
}

fn runs_table(runs: &[WorkflowRun]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Run ID").fg(Color::Cyan),
            Cell::new("Status"),
            Cell::new("Started"),
            Cell::new("Duration"),
            Cell::new("Error"),
        ]);

    for run in runs {
        let duration = run
            .completed_at
            .map(|done| format!("{}ms", (done - run.started_at).num_milliseconds()))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&run.id),
            format_status(run.status),
            Cell::new(run.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(duration),
            Cell::new(run.error_message.as_deref().unwrap_or("")),
        ]);
    }
    table
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

async fn handle_delete(id: &str, state: &AppState, json: bool) -> Result<()> {
    state.workflow_service.delete_workflow(id).await.map_err(|e| match e {
        WorkflowServiceError::NotFound(_) => anyhow::anyhow!("No workflow found with id '{id}'"),
        other => anyhow::anyhow!("Failed to delete workflow: {other}"),
    })?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!();
        println!("  {} Deleted workflow {}", style("*").green().bold(), id);
        println!();
    }
    Ok(())
}

fn format_status(status: RunStatus) -> Cell {
    let color = match status {
        RunStatus::Success => Color::Green,
        RunStatus::Skipped => Color::Yellow,
        RunStatus::Failed => Color::Red,
    };
    Cell::new(status.as_str()).fg(color)
}
