//! Monitor - one refresh cycle, end to end.
//!
//! Data flows one way per cycle:
//!
//! ```text
//! scan_tasks ──┐
//!              ├─> classify ─> AlertRegistry::reconcile ─> Board (sorted)
//! liveness ────┘
//! ```
//!
//! The monitor owns the alert registry and the collaborators; it holds no
//! other state between cycles. Nothing in `refresh` returns an error: bad
//! files are skipped, failed queries degrade to unknown, failed
//! notifications are logged.

use crate::alerts::{AlertOutcome, AlertRegistry, IssueKind, Observation};
use crate::classify::{classify, Classification, TaskState};
use crate::config::MonitorConfig;
use crate::error::{Result, WipdeckError};
use crate::liveness::{LivenessProvider, TmuxAdapter, WindowLiveness};
use crate::notify::Notifier;
use crate::scanner::{scan_tasks, TaskRecord};
use chrono::NaiveDateTime;
use std::cmp::Reverse;
use std::sync::Arc;

/// One task as displayed for a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub record: TaskRecord,
    pub classification: Classification,
    /// A worker process mentions this task file.
    pub has_worker: bool,
    /// The recorded window is open in a known window set.
    pub window_open: bool,
}

impl TaskRow {
    pub fn state(&self) -> TaskState {
        self.classification.state
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Sorted by severity (most urgent first), then task id.
    pub rows: Vec<TaskRow>,
    pub refreshed_at: NaiveDateTime,
    /// False when the window query failed or tmux is unavailable.
    pub windows_known: bool,
    pub alerts: AlertOutcome,
}

impl Board {
    /// Rows that need a human, in display order.
    pub fn attention_rows(&self) -> impl Iterator<Item = (usize, &TaskRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.state().needs_alert())
    }
}

pub struct Monitor {
    config: MonitorConfig,
    liveness: Box<dyn LivenessProvider>,
    tmux: Arc<dyn TmuxAdapter>,
    notifier: Box<dyn Notifier>,
    registry: AlertRegistry,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        liveness: Box<dyn LivenessProvider>,
        tmux: Arc<dyn TmuxAdapter>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self::with_registry(config, liveness, tmux, notifier, AlertRegistry::new())
    }

    /// Creates a monitor with a pre-seeded alert registry.
    pub fn with_registry(
        config: MonitorConfig,
        liveness: Box<dyn LivenessProvider>,
        tmux: Arc<dyn TmuxAdapter>,
        notifier: Box<dyn Notifier>,
        registry: AlertRegistry,
    ) -> Self {
        Self {
            config,
            liveness,
            tmux,
            notifier,
            registry,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn registry(&self) -> &AlertRegistry {
        &self.registry
    }

    pub fn can_switch_windows(&self) -> bool {
        self.tmux.is_available()
    }

    /// Runs one cycle: scan, liveness, classify, alert, sort.
    pub fn refresh(&mut self, now: NaiveDateTime) -> Board {
        let records = scan_tasks(&self.config.wip_dir(), now);
        let liveness = self.liveness.snapshot();

        let mut rows: Vec<TaskRow> = records
            .into_iter()
            .map(|record| {
                let classification = classify(&record, &liveness, now, &self.config);
                let has_worker = liveness.has_worker_for(&record.file_path);
                let window_open = record
                    .session_window_ref
                    .map(|w| liveness.window(w) == WindowLiveness::Open)
                    .unwrap_or(false);
                TaskRow {
                    record,
                    classification,
                    has_worker,
                    window_open,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            (Reverse(a.state().severity()), &a.record.id)
                .cmp(&(Reverse(b.state().severity()), &b.record.id))
        });

        let observations: Vec<Observation> = rows
            .iter()
            .filter_map(|row| {
                IssueKind::from_state(row.state()).map(|kind| Observation {
                    task_id: row.record.id.clone(),
                    task_name: row.record.name.clone(),
                    kind,
                    reason: row.classification.reason.clone(),
                })
            })
            .collect();

        let alerts = self
            .registry
            .reconcile(&observations, now, self.notifier.as_ref());

        tracing::debug!(
            tasks = rows.len(),
            attention = observations.len(),
            raised = alerts.raised.len(),
            resolved = alerts.resolved.len(),
            "Refresh cycle complete"
        );

        Board {
            rows,
            refreshed_at: now,
            windows_known: liveness.windows.is_some(),
            alerts,
        }
    }

    /// Switches the session to the window recorded for `row`.
    pub fn switch_to(&self, row: &TaskRow) -> Result<u32> {
        if !self.tmux.is_available() {
            return Err(WipdeckError::NotInTmux);
        }
        let window = row
            .record
            .session_window_ref
            .ok_or_else(|| WipdeckError::NoWindowRecorded(row.record.id.clone()))?;
        // Re-query: the board may be up to one interval old.
        if !self.tmux.list_windows()?.contains(&window) {
            return Err(WipdeckError::WindowNotFound(window));
        }
        self.tmux.select_window(window)?;
        tracing::info!(task = %row.record.id, window, "Switched tmux window");
        Ok(window)
    }
}
