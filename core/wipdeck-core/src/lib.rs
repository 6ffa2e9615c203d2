//! # wipdeck-core
//!
//! Core library for wipdeck, a terminal dashboard over in-progress agent task
//! files. Provides the pieces of one refresh cycle:
//!
//! - [`scanner`]: parse `wip/*.wiki` task files into immutable records
//! - [`liveness`]: tmux window and worker process snapshots
//! - [`classify`]: pure status classification
//! - [`alerts`] and [`notify`]: deduplicated desktop notifications
//! - [`engine`]: the [`Monitor`] that ties them together
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. The dashboard is a single control thread.
//! - **Graceful degradation**: Unreadable files are skipped, failed external
//!   queries become "unknown", failed notifications are logged.
//! - **Read-only**: Task files are never written.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wipdeck_core::*;
//!
//! let config = MonitorConfig::from_settings(load_settings());
//! let tmux: Arc<dyn TmuxAdapter> = Arc::new(CommandTmuxAdapter::new(config.command_timeout));
//! let liveness = SystemLivenessProvider::new(tmux.clone(), config.process_pattern.clone());
//! let mut monitor = Monitor::new(config, Box::new(liveness), tmux, Box::new(NullNotifier));
//! let board = monitor.refresh(chrono::Local::now().naive_local());
//! ```

pub mod alerts;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod liveness;
pub mod notify;
pub mod patterns;
pub mod scanner;
pub mod timestamp;

pub use alerts::{AlertEntry, AlertKey, AlertOutcome, AlertRegistry, IssueKind, Observation};
pub use classify::{classify, Classification, TaskState};
pub use config::{load_settings, MonitorConfig, Settings, StatusMarkers};
pub use engine::{Board, Monitor, TaskRow};
pub use error::{Result, WipdeckError};
pub use liveness::{
    CommandTmuxAdapter, LivenessProvider, LivenessSnapshot, StaticLivenessProvider,
    SystemLivenessProvider, TmuxAdapter, WindowLiveness, WorkerProcess,
};
pub use notify::{DesktopNotifier, Notification, Notifier, NullNotifier};
pub use scanner::{scan_tasks, Progress, TaskRecord};
pub use timestamp::{format_age, parse_timestamp};
