use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::shared::config::exe_dir;

/// Set up the global subscriber.
///
/// Logs go to:
/// - stdout (colored)
/// - `logs/backend.log` next to the executable, or `target/logs` (plain)
///
/// `RUST_LOG` wins over `default_filter`.
pub fn initialize(default_filter: &str) -> anyhow::Result<PathBuf> {
    let log_dir = exe_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|| PathBuf::from("target").join("logs"));

    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("cannot open log file {}", log_file_path.display()))?;

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    Ok(log_file_path)
}
