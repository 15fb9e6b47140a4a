use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use qronos_data_center::api::{DataCenterServer, DataCenterState};
use qronos_data_center::config::Settings;
use qronos_data_center::datasets::RefreshKind;
use qronos_data_center::services::{DataCenterSnapshot, TriggerOutcome};
use qronos_data_center::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "qronos-data-center", version, about = "Qronos market data center")]
struct Cli {
    /// Backend base URL, overriding QRONOS_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the storage path and the status of every product
    Status,

    /// Run a refresh job and wait for it to finish
    Refresh {
        #[arg(long, value_enum, default_value_t = Mode::Auto)]
        mode: Mode,
    },

    /// Start the data center HTTP API
    Serve {
        /// Listen host, overriding QRONOS_SERVER_HOST
        #[arg(long)]
        host: Option<String>,
        /// Listen port, overriding QRONOS_SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Incremental after a prior run, full otherwise
    Auto,
    Full,
    Incremental,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    qronos_data_center::init_tracing();
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }

    let state = AppState::new(settings).context("invalid settings")?;

    let result = match cli.command {
        Commands::Status => {
            state.controller.initialize().await;
            print_snapshot(&state.controller.snapshot());
            Ok(())
        }
        Commands::Refresh { mode } => refresh(&state, mode).await,
        Commands::Serve { host, port } => serve(&state, host, port).await,
    };

    state.shutdown();
    result
}

async fn refresh(state: &AppState, mode: Mode) -> anyhow::Result<()> {
    let controller = &state.controller;
    controller.initialize().await;

    let outcome = match mode {
        Mode::Auto => controller.decide_action().await,
        Mode::Full => controller.trigger(RefreshKind::Full).await,
        Mode::Incremental => controller.trigger(RefreshKind::Incremental).await,
    };

    for notification in state.notifications.recent() {
        println!("[{:?}] {}", notification.severity, notification.summary);
    }

    match outcome {
        TriggerOutcome::Completed { .. } => {
            // The status re-read runs after the configured delay
            tokio::time::sleep(state.settings.refresh_delay).await;
            while controller.has_pending_refresh() {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            print_snapshot(&controller.snapshot());
            Ok(())
        }
        TriggerOutcome::Failed { kind, reason } => {
            anyhow::bail!("{} refresh failed: {}", kind, reason)
        }
        TriggerOutcome::Rejected { kind, running } => {
            anyhow::bail!("{} refresh rejected: {} refresh running", kind, running)
        }
    }
}

async fn serve(state: &AppState, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.settings.server_host.clone());
    let port = port.unwrap_or(state.settings.server_port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;

    state.controller.initialize().await;

    let mut server = DataCenterServer::new(Arc::new(DataCenterState::from(state)));
    server.start(addr).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    server.shutdown().await;
    Ok(())
}

fn print_snapshot(snapshot: &DataCenterSnapshot) {
    println!("Storage path: {}", snapshot.storage_path_display);
    println!(
        "Primary action: {}{}",
        snapshot.primary_action.label(),
        if snapshot.is_busy { " (running)" } else { "" }
    );
    println!();

    if snapshot.datasets.is_empty() {
        println!("No dataset status available");
        return;
    }

    println!(
        "  {:<44} {:<20} {:<20} {:<14} {:<14}",
        "Product", "Data until", "Last update", "Full", "Incremental"
    );
    for dataset in &snapshot.datasets {
        // `*` marks a product with a job still running on the backend
        println!(
            "{} {:<44} {:<20} {:<20} {:<14} {:<14}",
            if dataset.is_active() { "*" } else { " " },
            dataset.display_label(),
            dataset.data_content_time.as_deref().unwrap_or("-"),
            dataset.last_update_time.as_deref().unwrap_or("-"),
            dataset.full_status.label(),
            dataset.update_status.label(),
        );
    }
}
