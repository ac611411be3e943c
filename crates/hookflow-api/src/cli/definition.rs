//! Local definition commands: `validate` and `run`.
//!
//! Both read a definition file from disk. `run` executes it with a real HTTP
//! transport but records nothing.

use std::path::Path;

use anyhow::{Context as _, Result};
use console::style;
use serde_json::Value;

use hookflow_core::workflow::context::context_from_payload;
use hookflow_core::workflow::definition::{load_definition_file, DefinitionError};
use hookflow_core::workflow::executor::WorkflowRunner;
use hookflow_infra::http::transport::ReqwestTransport;
use hookflow_types::workflow::{CreateWorkflowInput, RunOutcome, RunStatus};

/// Load and validate a definition file with a readable error.
pub fn load(file: &Path) -> Result<CreateWorkflowInput> {
    load_definition_file(file).map_err(|e| match e {
        DefinitionError::Parse(msg) => anyhow::anyhow!("Failed to parse {}: {msg}", file.display()),
        DefinitionError::Validation(msg) => {
            anyhow::anyhow!("Workflow validation failed: {msg}")
        }
        DefinitionError::Io(e) => anyhow::anyhow!("Failed to read {}: {e}", file.display()),
    })
}

/// `hookflow validate <file>`
pub fn validate(file: &Path, json: bool) -> Result<()> {
    let def = load(file)?;

    if json {
        let out = serde_json::json!({
            "valid": true,
            "name": def.name,
            "enabled": def.enabled,
            "steps": def.steps.iter().map(|s| s.kind()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        println!(
            "  {} '{}' is valid",
            style("*").green().bold(),
            style(&def.name).cyan()
        );
        for (index, step) in def.steps.iter().enumerate() {
            println!("  {}. {}", index + 1, step.kind());
        }
        println!();
    }
    Ok(())
}

/// `hookflow run <file> [--context <json>]`
///
/// Returns an error when the run failed, so the process exits non-zero.
pub async fn run(
    file: &Path,
    context: Option<&str>,
    workflow_id: &str,
    user_agent: &str,
    json: bool,
) -> Result<()> {
    let def = load(file)?;
    let payload: Option<Value> = context
        .map(serde_json::from_str)
        .transpose()
        .context("--context must be valid JSON")?;
    let initial = context_from_payload(payload)?;

    let runner = WorkflowRunner::new(ReqwestTransport::new(user_agent)?);
    let outcome = runner
        .execute_workflow(&def.steps, &initial, workflow_id)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&def.name, &outcome)?;
    }

    if outcome.status == RunStatus::Failed {
        anyhow::bail!(
            "workflow '{}' failed: {}",
            def.name,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_outcome(name: &str, outcome: &RunOutcome) -> Result<()> {
    let status = match outcome.status {
        RunStatus::Success => style(outcome.status.as_str()).green(),
        RunStatus::Skipped => style(outcome.status.as_str()).yellow(),
        RunStatus::Failed => style(outcome.status.as_str()).red(),
    };

    println!();
    println!("  Run of '{}': {}", style(name).cyan(), status.bold());
    if let Some(details) = &outcome.error_details {
        println!("  Failed step: {}", details.step);
        if let Some(code) = details.status {
            println!("  HTTP status: {code}");
        }
    }
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&Value::Object(outcome.context.clone()))?
    );
    println!();
    Ok(())
}
