use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// `RUST_LOG` wins over the configured level
fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Installs the global subscriber: stderr by default, or a non-rotating
/// file when `log_file` is set.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = build_filter(log_level);

    let file_layer = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("log_file {:?} has no file name", path))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_appender = RollingFileAppender::new(Rotation::NEVER, dir, file_name);

            Some(
                fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(SystemTime)
                    .with_ansi(false)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    let stderr_layer = log_file
        .is_none()
        .then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match log_file {
        Some(path) => tracing::info!("Logging system initialized. Writing to {:?}", path),
        None => tracing::debug!("Logging system initialized. Writing to stderr"),
    }

    Ok(())
}
