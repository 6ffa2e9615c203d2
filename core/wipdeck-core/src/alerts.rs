//! Alert registry: deduplicated attention alerts across refresh cycles.
//!
//! Keyed by `(task id, issue kind)`. An entry is created the first cycle an
//! issue is observed (one notification attempt), kept while the issue
//! persists, and dropped the first cycle it is gone, so a later recurrence
//! notifies again. The registry lives for the dashboard process only.

use crate::classify::TaskState;
use crate::notify::{Notification, Notifier};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

/// Alert-worthy states. Completed and Running have no issue kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueKind {
    NeedsAttention,
    Crashed,
    Blocked,
    Stale,
}

impl IssueKind {
    pub fn from_state(state: TaskState) -> Option<Self> {
        match state {
            TaskState::NeedsAttention => Some(IssueKind::NeedsAttention),
            TaskState::Crashed => Some(IssueKind::Crashed),
            TaskState::Blocked => Some(IssueKind::Blocked),
            TaskState::Stale => Some(IssueKind::Stale),
            TaskState::Completed | TaskState::Running => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IssueKind::NeedsAttention => "NEEDS ATTENTION",
            IssueKind::Crashed => "CRASHED",
            IssueKind::Blocked => "BLOCKED",
            IssueKind::Stale => "STALE",
        }
    }
}

pub type AlertKey = (String, IssueKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertEntry {
    pub first_seen: NaiveDateTime,
    /// Whether the notification for this occurrence was delivered.
    pub notified: bool,
}

/// One attention-worthy issue seen this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub task_id: String,
    pub task_name: String,
    pub kind: IssueKind,
    pub reason: Option<String>,
}

impl Observation {
    fn key(&self) -> AlertKey {
        (self.task_id.clone(), self.kind)
    }
}

/// What changed in the registry during one reconcile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertOutcome {
    pub raised: Vec<AlertKey>,
    pub resolved: Vec<AlertKey>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertRegistry {
    entries: BTreeMap<AlertKey, AlertEntry>,
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry already holding `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = (AlertKey, AlertEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, task_id: &str, kind: IssueKind) -> Option<&AlertEntry> {
        self.entries.get(&(task_id.to_string(), kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AlertKey, &AlertEntry)> {
        self.entries.iter()
    }

    /// Applies this cycle's observations: notifies new issues once, drops
    /// resolved ones. A failed notification still records the entry and is
    /// not retried.
    pub fn reconcile(
        &mut self,
        observations: &[Observation],
        now: NaiveDateTime,
        notifier: &dyn Notifier,
    ) -> AlertOutcome {
        let mut outcome = AlertOutcome::default();
        let current: BTreeSet<AlertKey> = observations.iter().map(Observation::key).collect();

        self.entries.retain(|key, _| {
            let keep = current.contains(key);
            if !keep {
                outcome.resolved.push(key.clone());
            }
            keep
        });

        for observation in observations {
            let key = observation.key();
            if self.entries.contains_key(&key) {
                continue;
            }

            let notification = Notification {
                task_id: observation.task_id.clone(),
                task_name: observation.task_name.clone(),
                kind: observation.kind,
                reason: observation.reason.clone(),
            };
            let notified = match notifier.notify(&notification) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        task = %observation.task_id,
                        kind = ?observation.kind,
                        "Notification failed"
                    );
                    false
                }
            };

            tracing::info!(
                task = %observation.task_id,
                kind = ?observation.kind,
                notified,
                "Alert raised"
            );
            self.entries.insert(
                key.clone(),
                AlertEntry {
                    first_seen: now,
                    notified,
                },
            );
            outcome.raised.push(key);
        }

        for (task, kind) in &outcome.resolved {
            tracing::info!(task = %task, kind = ?kind, "Alert resolved");
        }

        outcome
    }
}
