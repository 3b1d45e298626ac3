//! Command-line interface for pg-table-sync
//!
//! ```bash
//! # Copy every table of the source schema once
//! pg-table-sync run --config sync.toml
//!
//! # Copy once at startup, then wait for GET /sync
//! PG_TABLE_SYNC_CONFIG=sync.yaml pg-table-sync serve --listen 127.0.0.1:8000
//!
//! # Keep a copy of the log
//! pg-table-sync run --config sync.json --log-file logs/sync.log
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use pg_table_sync::{router, AppConfig, AppState, Orchestrator};
use pg_table_sync_postgresql::PgConnector;
use std::path::PathBuf;
use std::sync::Arc;
use sync_core::{Diagnostics, TracingDiagnostics};

#[derive(Parser)]
#[command(name = "pg-table-sync")]
#[command(about = "Copy PostgreSQL tables and their schema from one database to another")]
#[command(long_about = None)]
struct Cli {
    /// Also append log output to this file
    #[arg(long, global = true, env = "PG_TABLE_SYNC_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass and exit
    Run {
        /// Path to the TOML or YAML config file
        #[arg(long, env = "PG_TABLE_SYNC_CONFIG")]
        config: PathBuf,
    },

    /// Run one sync pass, then serve the HTTP trigger
    Serve {
        /// Path to the TOML or YAML config file
        #[arg(long, env = "PG_TABLE_SYNC_CONFIG")]
        config: PathBuf,

        /// Address to listen on (overrides `server.listen` in the config file)
        #[arg(long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    pg_table_sync::logging::init(cli.log_file.as_deref())?;

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
    let orchestrator = Orchestrator::new(PgConnector::new(diagnostics.clone()), diagnostics);

    match cli.command {
        Commands::Run { config } => {
            let state = AppState::new(orchestrator, config);
            let report = state.trigger().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Serve { config, listen } => {
            let app_config = AppConfig::from_file(&config)
                .with_context(|| format!("Failed to load configuration from {}", config.display()))?;
            let listen = listen.unwrap_or(app_config.server.listen);
            let state = AppState::new(orchestrator, config);

            // A failed startup pass does not prevent serving; /sync can retry.
            match state.trigger().await {
                Ok(report) => tracing::info!(
                    tables = report.tables.len(),
                    rows = report.totals.rows_transferred,
                    "Startup sync completed"
                ),
                Err(e) => tracing::error!("Startup sync failed: {e:#}"),
            }

            let listener = tokio::net::TcpListener::bind(&listen)
                .await
                .with_context(|| format!("Failed to bind {listen}"))?;
            tracing::info!("Listening on {listen}");
            axum::serve(listener, router(state))
                .await
                .context("HTTP server failed")?;
        }
    }

    Ok(())
}
