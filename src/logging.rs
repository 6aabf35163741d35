//! Logging setup.
//!
//! The TUI owns the terminal, so every log line goes to a file under the local
//! data directory, rotated daily and written from a background thread. The
//! filter follows `RUST_LOG` and defaults to [`DEFAULT_LOG_FILTER`].

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "jiragen=info,warn";

const LOG_FILE_PREFIX: &str = "jiragen.log";

/// Install the global subscriber.
///
/// The returned guard flushes pending lines when dropped; keep it alive until
/// the process exits.
///
/// # Log directory
///
/// - Linux: `~/.local/share/jiragen/logs/`
/// - macOS: `~/Library/Application Support/jiragen/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\jiragen\logs\`
pub fn init() -> anyhow::Result<WorkerGuard> {
    let dir = log_directory().context("Could not determine the local data directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .context("A global logger is already installed")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), log_dir = %dir.display(), "jiragen starting");
    Ok(guard)
}

/// The filter from `RUST_LOG`, falling back to the default.
fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Where log files are written.
pub fn log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join("jiragen").join("logs"))
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("jiragen shutting down");
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_log_directory_layout() {
        if let Some(dir) = log_directory() {
            assert!(dir.ends_with("jiragen/logs"));
        }
    }

    #[test]
    #[serial]
    fn test_filter_defaults_without_env() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter().to_string(), EnvFilter::new(DEFAULT_LOG_FILTER).to_string());
    }

    #[test]
    #[serial]
    fn test_filter_follows_env() {
        std::env::set_var("RUST_LOG", "jiragen=trace");
        let rendered = filter().to_string();
        std::env::remove_var("RUST_LOG");
        assert!(rendered.contains("jiragen=trace"));
    }
}
