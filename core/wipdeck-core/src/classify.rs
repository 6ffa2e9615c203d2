//! Task status classification.
//!
//! Pure function of (record, liveness, clock, config). Precedence, highest first:
//!
//! ```text
//! Completed       status contains a completion marker
//! NeedsAttention  status is exactly a lifecycle hook state (Stop, PermissionRequest, ...)
//! Blocked         status contains a blocked marker
//! Crashed         recorded window is absent from a known window set
//! Stale           last update older than the stale threshold
//! Running         otherwise
//! ```
//!
//! Textual signals outrank liveness and clock signals: an idle worker between
//! tool calls looks stale by clock alone, and a hook state means the worker
//! stopped on purpose.

use crate::config::MonitorConfig;
use crate::liveness::{LivenessSnapshot, WindowLiveness};
use crate::scanner::TaskRecord;
use chrono::NaiveDateTime;
use std::fmt;

/// Operational state of a task for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    Completed,
    NeedsAttention,
    Blocked,
    Crashed,
    Stale,
    Running,
}

impl TaskState {
    /// Sort rank for display; higher is more urgent.
    pub fn severity(self) -> u8 {
        match self {
            TaskState::NeedsAttention => 5,
            TaskState::Crashed => 4,
            TaskState::Blocked => 3,
            TaskState::Stale => 2,
            TaskState::Running => 1,
            TaskState::Completed => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskState::Completed => "COMPLETED",
            TaskState::NeedsAttention => "NEEDS ATTENTION",
            TaskState::Blocked => "BLOCKED",
            TaskState::Crashed => "CRASHED",
            TaskState::Stale => "STALE",
            TaskState::Running => "RUNNING",
        }
    }

    /// Completed and Running never raise alerts.
    pub fn needs_alert(self) -> bool {
        !matches!(self, TaskState::Completed | TaskState::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A state plus the human-readable reason behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub state: TaskState,
    pub reason: Option<String>,
}

impl Classification {
    fn new(state: TaskState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: Some(reason.into()),
        }
    }

    fn running() -> Self {
        Self {
            state: TaskState::Running,
            reason: None,
        }
    }
}

pub fn classify(
    record: &TaskRecord,
    liveness: &LivenessSnapshot,
    now: NaiveDateTime,
    config: &MonitorConfig,
) -> Classification {
    let status = record.status_text.as_str();
    let markers = &config.markers;

    if markers.is_completed(status) {
        return Classification {
            state: TaskState::Completed,
            reason: None,
        };
    }

    if markers.is_hook_state(status) {
        return Classification::new(TaskState::NeedsAttention, format!("status: {}", status));
    }

    if markers.is_blocked(status) {
        return Classification::new(TaskState::Blocked, format!("status: {}", status));
    }

    if let Some(window) = record.session_window_ref {
        if liveness.window(window) == WindowLiveness::Closed {
            return Classification::new(TaskState::Crashed, format!("window {} closed", window));
        }
    }

    if let Some(last_updated) = record.last_updated {
        let age_secs = now.signed_duration_since(last_updated).num_seconds();
        let threshold_secs = i64::try_from(config.stale_threshold.as_secs()).unwrap_or(i64::MAX);
        if age_secs > threshold_secs {
            return Classification::new(
                TaskState::Stale,
                format!("{}m since last update", age_secs / 60),
            );
        }
    }

    Classification::running()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Progress;
    use chrono::Duration;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-02-14 20:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(status: &str, window: Option<u32>, age_minutes: Option<i64>) -> TaskRecord {
        TaskRecord {
            id: "task".to_string(),
            file_path: PathBuf::from("/w/wip/task.wiki"),
            name: "task".to_string(),
            status_text: status.to_string(),
            last_updated: age_minutes.map(|m| now() - Duration::minutes(m)),
            session_window_ref: window,
            progress: Progress::default(),
        }
    }

    fn live(windows: &[u32]) -> LivenessSnapshot {
        LivenessSnapshot::new(Some(windows.iter().copied().collect::<BTreeSet<_>>()), vec![])
    }

    fn config() -> MonitorConfig {
        MonitorConfig::default()
    }

    fn state_of(record: &TaskRecord, liveness: &LivenessSnapshot) -> TaskState {
        classify(record, liveness, now(), &config()).state
    }

    #[test]
    fn test_waiting_for_review_is_blocked() {
        let r = record("Waiting for review", Some(1), Some(2));
        assert_eq!(state_of(&r, &live(&[0, 1, 2])), TaskState::Blocked);
    }

    #[test]
    fn test_old_update_with_live_window_is_stale() {
        let r = record("Implementing", Some(1), Some(15));
        let c = classify(&r, &live(&[0, 1, 2]), now(), &config());
        assert_eq!(c.state, TaskState::Stale);
        assert_eq!(c.reason.as_deref(), Some("15m since last update"));
    }

    #[test]
    fn test_missing_window_is_crashed() {
        let r = record("Implementing", Some(3), Some(1));
        assert_eq!(state_of(&r, &live(&[0, 1, 2])), TaskState::Crashed);
    }

    #[test]
    fn test_hook_state_outranks_crashed() {
        let r = record("Stop", Some(3), Some(1));
        assert_eq!(state_of(&r, &live(&[0, 1, 2])), TaskState::NeedsAttention);
    }

    #[test]
    fn test_completed_overrides_everything() {
        let r = record("Done — merged PR #42", Some(9), Some(600));
        assert_eq!(state_of(&r, &live(&[])), TaskState::Completed);
        assert_eq!(state_of(&r, &LivenessSnapshot::unknown()), TaskState::Completed);
    }

    #[test]
    fn test_completed_beats_hook_and_blocked_markers() {
        let r = record("blocked but done", None, None);
        assert_eq!(state_of(&r, &live(&[])), TaskState::Completed);
    }

    #[test]
    fn test_unknown_window_never_crashes() {
        let r = record("Implementing", None, Some(1));
        assert_eq!(state_of(&r, &live(&[])), TaskState::Running);
    }

    #[test]
    fn test_unknown_liveness_never_crashes() {
        let r = record("Implementing", Some(3), Some(1));
        assert_eq!(
            state_of(&r, &LivenessSnapshot::unknown()),
            TaskState::Running
        );
    }

    #[test]
    fn test_crashed_outranks_stale() {
        let r = record("Implementing", Some(3), Some(60));
        assert_eq!(state_of(&r, &live(&[0])), TaskState::Crashed);
    }

    #[test]
    fn test_stale_threshold_is_strict() {
        let at_threshold = record("Implementing", None, Some(10));
        assert_eq!(state_of(&at_threshold, &live(&[])), TaskState::Running);

        let mut just_over = record("Implementing", None, None);
        just_over.last_updated = Some(now() - Duration::seconds(10 * 60 + 1));
        assert_eq!(state_of(&just_over, &live(&[])), TaskState::Stale);
    }

    #[test]
    fn test_huge_threshold_never_goes_stale() {
        let mut config = config();
        config.stale_threshold = std::time::Duration::from_secs(u64::MAX);
        let r = record("Implementing", None, Some(1));
        assert_eq!(
            classify(&r, &live(&[]), now(), &config).state,
            TaskState::Running
        );
    }

    #[test]
    fn test_blocked_outranks_stale() {
        let r = record("Waiting for review", Some(1), Some(60));
        assert_eq!(state_of(&r, &live(&[1])), TaskState::Blocked);
    }

    #[test]
    fn test_hook_state_outranks_stale() {
        let r = record("PermissionRequest", Some(1), Some(60));
        assert_eq!(state_of(&r, &live(&[1])), TaskState::NeedsAttention);
    }

    #[test]
    fn test_unknown_age_is_never_stale() {
        let r = record("Implementing", None, None);
        assert_eq!(state_of(&r, &live(&[])), TaskState::Running);
    }

    #[test]
    fn test_custom_markers_drive_classification() {
        let mut config = config();
        config.markers.completion = vec!["shipped".to_string()];
        let r = record("Shipped to prod", None, Some(100));
        assert_eq!(
            classify(&r, &live(&[]), now(), &config).state,
            TaskState::Completed
        );
    }

    #[test]
    fn test_severity_orders_attention_first() {
        let mut states = vec![
            TaskState::Running,
            TaskState::Completed,
            TaskState::Stale,
            TaskState::NeedsAttention,
            TaskState::Blocked,
            TaskState::Crashed,
        ];
        states.sort_by_key(|s| std::cmp::Reverse(s.severity()));
        assert_eq!(
            states,
            vec![
                TaskState::NeedsAttention,
                TaskState::Crashed,
                TaskState::Blocked,
                TaskState::Stale,
                TaskState::Running,
                TaskState::Completed,
            ]
        );
    }
}
