//! Error types for wipdeck-core operations.
//!
//! Only startup checks and user-triggered actions surface these to the caller.
//! The refresh cycle itself degrades instead of failing (see `engine`).

use std::path::PathBuf;
use std::time::Duration;

/// All errors that can occur in wipdeck-core operations.
#[derive(Debug, thiserror::Error)]
pub enum WipdeckError {
    // ─────────────────────────────────────────────────────────────────────
    // Startup Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Wiki path not found: {0}")]
    WikiPathNotFound(PathBuf),

    #[error("Wiki path is not a directory: {0}")]
    WikiPathNotDirectory(PathBuf),

    #[error("Required tool not found on PATH: {0}")]
    ToolMissing(String),

    #[error("An interactive terminal is required")]
    NotInteractive,

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // External Command Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Command execution failed: {command}: {details}")]
    CommandFailed { command: String, details: String },

    #[error("Command timed out after {timeout:?}: {command}")]
    CommandTimedOut { command: String, timeout: Duration },

    // ─────────────────────────────────────────────────────────────────────
    // Window Switching Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Not running inside tmux session")]
    NotInTmux,

    #[error("Task {0} has no tmux window recorded")]
    NoWindowRecorded(String),

    #[error("Tmux window {0} is not open")]
    WindowNotFound(u32),
}

/// Convenience type alias for Results using WipdeckError.
pub type Result<T> = std::result::Result<T, WipdeckError>;

impl WipdeckError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        WipdeckError::Io {
            context: context.into(),
            source,
        }
    }
}
