//! gatesync - reconciles physical-access grants against workforce compliance.
//!
//! Runs in one of two modes:
//! - `run`: execute a single reconciliation pass and exit
//! - `serve`: host the HTTP trigger endpoint and reconcile on an interval

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod server;

use config::AppConfig;
use server::AppState;

/// gatesync - physical-access grant reconciliation
#[derive(Parser)]
#[command(name = "gatesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a single reconciliation run and exit
    Run,

    /// Serve the HTTP trigger endpoint and reconcile on an interval
    Serve,
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gatesync=debug")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    let state = AppState::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Client initialization error: {e}");
        std::process::exit(1);
    });

    match cli.command {
        Commands::Run => match server::execute_run(&state).await {
            Ok(summary) => println!("Reconciliation completed: {summary}."),
            Err(e) => {
                eprintln!("Reconciliation failed: {e}");
                std::process::exit(1);
            }
        },
        Commands::Serve => {
            tracing::info!(
                listen_addr = %config.listen_addr,
                sync_interval_secs = config.sync_interval_secs,
                group_id = config.group_id,
                "starting gatesync server"
            );
            server::serve(config, state).await.unwrap_or_else(|e| {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            });
        }
    }
}
