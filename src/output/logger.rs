//! File logging via tracing.
//!
//! The terminal belongs to the viewer, so logs always go to a file under
//! `$TMPDIR/runlens/logs/`. The level is controlled by `RUNLENS_LOG`, e.g.
//! `RUNLENS_LOG=debug runlens events.ndjson`.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "RUNLENS_LOG";
const DEFAULT_FILTER: &str = "runlens=info,warn";

/// Install the global subscriber and return the log file path.
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_name = log_file_name();
    let log_path = log_dir.join(&file_name);
    let appender = tracing_appender::rolling::never(&log_dir, &file_name);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "runlens starting");
    tracing::info!("Log file: {}", log_path.display());
    Ok(log_path)
}

/// Get the log directory path.
pub fn log_directory() -> PathBuf {
    let base_dir = env::var("TMPDIR")
        .or_else(|_| env::var("XDG_RUNTIME_DIR"))
        .unwrap_or_else(|_| "/tmp".to_string());

    PathBuf::from(base_dir).join("runlens").join("logs")
}

fn log_file_name() -> String {
    format!(
        "{}-{}.log",
        Local::now().format("%Y%m%d-%H%M%S"),
        std::process::id()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directory_is_namespaced() {
        let dir = log_directory();
        assert!(dir.ends_with("runlens/logs"));
    }

    #[test]
    fn log_file_name_is_timestamped() {
        let name = log_file_name();
        assert!(name.ends_with(".log"));
        assert_eq!(&name[8..9], "-");
    }
}
