//! File logging for the dashboard.
//!
//! The terminal belongs to the TUI, so logs go to a daily rolling file under
//! `~/.claude/logs/`. `WIPDECK_DEBUG_LOG=1` forces debug level; otherwise
//! `RUST_LOG` applies, defaulting to info.

use fs_err as fs;
use std::env;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "wipdeck.log";

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed. Returns `None` when no log dir is usable.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    if let Err(err) = fs::create_dir_all(&dir) {
        eprintln!("Warning: logging disabled: {}", err);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    if result.is_err() {
        return None;
    }
    Some(guard)
}

fn filter() -> EnvFilter {
    let debug_enabled = env::var("WIPDECK_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude").join("logs"))
}
