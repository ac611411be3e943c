//! CLI command definitions for the `hookflow` binary.
//!
//! Uses clap derive macros for argument parsing. Local commands (`validate`,
//! `run`) work on definition files without touching the database; the
//! `workflow` subcommands manage stored workflows.

pub mod definition;
pub mod workflow;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Webhook-triggered workflow engine.
#[derive(Parser)]
#[command(name = "hookflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API and trigger server.
    Serve {
        /// Port to listen on (defaults to the configured port).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,
    },

    /// Validate a workflow definition file (JSON or YAML).
    Validate {
        /// Path to the definition file.
        file: PathBuf,
    },

    /// Execute a workflow definition locally without storing anything.
    Run {
        /// Path to the definition file.
        file: PathBuf,

        /// Initial context as a JSON object.
        #[arg(long)]
        context: Option<String>,

        /// Workflow id exposed to templates as `workflow_id`.
        #[arg(long, default_value = "wf_local")]
        workflow_id: String,
    },

    /// Manage stored workflows.
    #[command(alias = "wf")]
    Workflow {
        #[command(subcommand)]
        action: workflow::WorkflowCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
