//! Hookflow CLI and REST API entry point.
//!
//! Binary name: `hookflow`
//!
//! Parses CLI arguments, loads configuration, initializes tracing, then
//! dispatches to the appropriate command handler or starts the API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use hookflow_infra::config::{apply_env_overrides, load_global_config, resolve_data_dir};
use hookflow_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_directive};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config, tracing, or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "hookflow", &mut std::io::stdout());
        return Ok(());
    }

    let _ = dotenvy::dotenv();

    let data_dir = resolve_data_dir();
    let mut config = load_global_config(&data_dir).await;
    apply_env_overrides(&mut config);

    init_tracing(
        verbosity_directive(cli.verbose, cli.quiet),
        config.log.format,
        config.log.otel,
    )
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli, data_dir, config).await;
    shutdown_tracing();
    result
}

async fn run(
    cli: Cli,
    data_dir: std::path::PathBuf,
    config: hookflow_types::config::GlobalConfig,
) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate { file } => cli::definition::validate(&file, cli.json)?,

        Commands::Run {
            file,
            context,
            workflow_id,
        } => {
            cli::definition::run(
                &file,
                context.as_deref(),
                &workflow_id,
                &config.http.user_agent,
                cli.json,
            )
            .await?;
        }

        Commands::Workflow { action } => {
            let state = AppState::init(&data_dir, &config).await?;
            cli::workflow::handle_workflow_command(action, &state, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let state = AppState::init(&data_dir, &config).await?;

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(%addr, data_dir = %data_dir.display(), "server listening");
            if !cli.quiet {
                println!(
                    "  {} Hookflow listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => unreachable!("handled in main"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
