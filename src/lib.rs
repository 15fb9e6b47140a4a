//! Qronos Data Center
//!
//! Tracks the download status of the market-data products used by the
//! Qronos backtest backend and triggers full or incremental refresh jobs.
//! Exposed as a CLI and as a local HTTP API for the desktop UI.

pub mod api;
pub mod backend;
pub mod config;
pub mod datasets;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_helpers;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qronos_data_center=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
