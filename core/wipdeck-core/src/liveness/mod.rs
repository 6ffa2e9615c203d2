//! Liveness oracle for task workers.
//!
//! Each refresh takes one [`LivenessSnapshot`]: the open tmux windows of the
//! current session and the running worker processes. Snapshots are never
//! reused across cycles because window indices and PIDs get recycled.
//!
//! Either query may fail. A failed window query leaves `windows` as `None`
//! (unknown), which the classifier treats as "cannot judge", not "closed".

mod command;
mod process;
mod tmux;

pub use command::run_bounded;
pub use process::{filter_workers, list_worker_processes, WorkerProcess};
pub use tmux::{inside_tmux, CommandTmuxAdapter, TmuxAdapter};

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Point-in-time facts about live sessions and processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessSnapshot {
    /// Open window indices, or `None` when the query failed or tmux is unavailable.
    pub windows: Option<BTreeSet<u32>>,
    pub workers: Vec<WorkerProcess>,
}

/// What a snapshot says about one recorded window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLiveness {
    Open,
    Closed,
    Unknown,
}

impl LivenessSnapshot {
    pub fn new(windows: Option<BTreeSet<u32>>, workers: Vec<WorkerProcess>) -> Self {
        Self { windows, workers }
    }

    /// Snapshot with no usable signals.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn window(&self, index: u32) -> WindowLiveness {
        match &self.windows {
            Some(windows) if windows.contains(&index) => WindowLiveness::Open,
            Some(_) => WindowLiveness::Closed,
            None => WindowLiveness::Unknown,
        }
    }

    /// True if some worker's command line mentions the task file.
    pub fn has_worker_for(&self, file_path: &Path) -> bool {
        let path = file_path.to_string_lossy();
        !path.is_empty()
            && self
                .workers
                .iter()
                .any(|worker| worker.command.contains(path.as_ref()))
    }
}

/// Produces one liveness snapshot per refresh cycle.
pub trait LivenessProvider: Send + Sync {
    fn snapshot(&self) -> LivenessSnapshot;
}

/// Real provider: tmux window listing plus host process enumeration.
pub struct SystemLivenessProvider {
    tmux: Arc<dyn TmuxAdapter>,
    process_pattern: String,
}

impl SystemLivenessProvider {
    pub fn new(tmux: Arc<dyn TmuxAdapter>, process_pattern: impl Into<String>) -> Self {
        Self {
            tmux,
            process_pattern: process_pattern.into(),
        }
    }
}

impl LivenessProvider for SystemLivenessProvider {
    fn snapshot(&self) -> LivenessSnapshot {
        let windows = if self.tmux.is_available() {
            match self.tmux.list_windows() {
                Ok(windows) => Some(windows),
                Err(err) => {
                    tracing::warn!(error = %err, "Window query failed; liveness unknown this cycle");
                    None
                }
            }
        } else {
            None
        };

        let workers = list_worker_processes(&self.process_pattern);
        tracing::debug!(
            windows = ?windows,
            workers = workers.len(),
            "Liveness snapshot taken"
        );

        LivenessSnapshot { windows, workers }
    }
}

/// In-memory provider. Returns whatever snapshot was last set.
#[derive(Debug, Default)]
pub struct StaticLivenessProvider {
    snapshot: Mutex<LivenessSnapshot>,
}

impl StaticLivenessProvider {
    pub fn new(snapshot: LivenessSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    pub fn set(&self, snapshot: LivenessSnapshot) {
        if let Ok(mut current) = self.snapshot.lock() {
            *current = snapshot;
        }
    }
}

impl LivenessProvider for StaticLivenessProvider {
    fn snapshot(&self) -> LivenessSnapshot {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }
}

impl<P: LivenessProvider + ?Sized> LivenessProvider for Arc<P> {
    fn snapshot(&self) -> LivenessSnapshot {
        (**self).snapshot()
    }
}
