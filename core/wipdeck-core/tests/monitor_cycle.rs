//! End-to-end refresh cycles against a temporary wiki with fake liveness,
//! tmux and notification collaborators.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wipdeck_core::{
    AlertEntry, AlertRegistry, IssueKind, LivenessProvider, LivenessSnapshot, Monitor, MonitorConfig,
    Notification, Notifier, Result, StaticLivenessProvider, TaskState, TmuxAdapter,
    WipdeckError,
};

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeTmux {
    available: bool,
    windows: Mutex<BTreeSet<u32>>,
    selected: Mutex<Vec<u32>>,
}

impl TmuxAdapter for FakeTmux {
    fn list_windows(&self) -> Result<BTreeSet<u32>> {
        Ok(self.windows.lock().unwrap().clone())
    }

    fn select_window(&self, index: u32) -> Result<()> {
        self.selected.lock().unwrap().push(index);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

struct Harness {
    _temp: TempDir,
    wip: std::path::PathBuf,
    liveness: Arc<StaticLivenessProvider>,
    tmux: Arc<FakeTmux>,
    notifier: RecordingNotifier,
    monitor: Monitor,
}

fn now() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-02-14 20:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn stamp(at: NaiveDateTime) -> String {
    at.format("%A %d %B %Y %H:%M:%S").to_string()
}

fn live(windows: &[u32]) -> LivenessSnapshot {
    LivenessSnapshot::new(Some(windows.iter().copied().collect()), vec![])
}

fn harness_with_registry(windows: &[u32], registry: AlertRegistry) -> Harness {
    let temp = TempDir::new().unwrap();
    let wip = temp.path().join("wip");
    std::fs::create_dir_all(&wip).unwrap();

    let config = MonitorConfig {
        wiki_path: temp.path().to_path_buf(),
        ..MonitorConfig::default()
    };
    let liveness = Arc::new(StaticLivenessProvider::new(live(windows)));
    let tmux = Arc::new(FakeTmux {
        available: true,
        windows: Mutex::new(windows.iter().copied().collect()),
        ..FakeTmux::default()
    });
    let notifier = RecordingNotifier::default();
    let provider: Box<dyn LivenessProvider> = Box::new(liveness.clone());
    let adapter: Arc<dyn TmuxAdapter> = tmux.clone();
    let monitor = Monitor::with_registry(
        config,
        provider,
        adapter,
        Box::new(notifier.clone()),
        registry,
    );

    Harness {
        _temp: temp,
        wip,
        liveness,
        tmux,
        notifier,
        monitor,
    }
}

fn harness(windows: &[u32]) -> Harness {
    harness_with_registry(windows, AlertRegistry::new())
}

fn write_task(dir: &Path, id: &str, status: &str, window: Option<u32>, age_minutes: i64) {
    let mut content = format!("# Task Name: {id}\n\n**Status**: {status}\n");
    if let Some(window) = window {
        content.push_str(&format!("**Tmux Window**: {window}\n"));
    }
    content.push_str(&format!(
        "**Last Updated Date/Time**: {}\n",
        stamp(now() - Duration::minutes(age_minutes))
    ));
    std::fs::write(dir.join(format!("{id}.wiki")), content).unwrap();
}

fn state_of(board: &wipdeck_core::Board, id: &str) -> TaskState {
    board
        .rows
        .iter()
        .find(|row| row.record.id == id)
        .map(|row| row.state())
        .expect("task present")
}

#[test]
fn blocked_task_notifies_once_on_first_occurrence() {
    let mut h = harness(&[0, 1, 2]);
    write_task(&h.wip, "review", "Waiting for review", Some(1), 2);

    let board = h.monitor.refresh(now());
    assert_eq!(state_of(&board, "review"), TaskState::Blocked);
    assert_eq!(h.notifier.count(), 1);

    let sent = h.notifier.sent.lock().unwrap();
    assert_eq!(sent[0].kind, IssueKind::Blocked);
    assert_eq!(sent[0].task_name, "review");
}

#[test]
fn mixed_tasks_classify_and_sort_by_severity() {
    let mut h = harness(&[0, 1, 2]);
    write_task(&h.wip, "stale", "Implementing", Some(1), 15);
    write_task(&h.wip, "crashed", "Implementing", Some(3), 1);
    write_task(&h.wip, "hook", "Stop", Some(5), 1);
    write_task(&h.wip, "done", "Done — merged PR #42", Some(9), 120);
    write_task(&h.wip, "fresh", "Implementing", Some(2), 1);

    let board = h.monitor.refresh(now());

    assert_eq!(state_of(&board, "stale"), TaskState::Stale);
    assert_eq!(state_of(&board, "crashed"), TaskState::Crashed);
    assert_eq!(state_of(&board, "hook"), TaskState::NeedsAttention);
    assert_eq!(state_of(&board, "done"), TaskState::Completed);
    assert_eq!(state_of(&board, "fresh"), TaskState::Running);

    let order: Vec<_> = board.rows.iter().map(|r| r.record.id.as_str()).collect();
    assert_eq!(order, vec!["hook", "crashed", "stale", "fresh", "done"]);
    assert_eq!(h.notifier.count(), 3);
}

#[test]
fn unchanged_inputs_are_idempotent() {
    let mut h = harness(&[0, 1]);
    write_task(&h.wip, "a", "Implementing", Some(4), 1);
    write_task(&h.wip, "b", "blocked on CI", Some(0), 1);
    write_task(&h.wip, "c", "Implementing", None, 30);

    let first = h.monitor.refresh(now());
    let notified_after_first = h.notifier.count();
    let second = h.monitor.refresh(now());

    assert_eq!(first.rows, second.rows);
    assert_eq!(h.notifier.count(), notified_after_first);
    assert!(second.alerts.raised.is_empty());
    assert!(second.alerts.resolved.is_empty());
}

#[test]
fn completion_removes_existing_alert_without_notifying() {
    let registry = AlertRegistry::with_entries([(
        ("ship".to_string(), IssueKind::Stale),
        AlertEntry {
            first_seen: now() - Duration::minutes(5),
            notified: true,
        },
    )]);
    let mut h = harness_with_registry(&[0], registry);
    write_task(&h.wip, "ship", "Done — merged PR #42", Some(0), 30);

    let board = h.monitor.refresh(now());

    assert_eq!(state_of(&board, "ship"), TaskState::Completed);
    assert!(h.monitor.registry().is_empty());
    assert_eq!(
        board.alerts.resolved,
        vec![("ship".to_string(), IssueKind::Stale)]
    );
    assert_eq!(h.notifier.count(), 0);
}

#[test]
fn vanished_task_resolves_and_recurrence_renotifies() {
    let mut h = harness(&[0]);
    write_task(&h.wip, "gone", "Implementing", Some(3), 1);

    h.monitor.refresh(now());
    assert_eq!(h.notifier.count(), 1);

    std::fs::remove_file(h.wip.join("gone.wiki")).unwrap();
    let board = h.monitor.refresh(now());
    assert!(board.rows.is_empty());
    assert!(h.monitor.registry().is_empty());

    write_task(&h.wip, "gone", "Implementing", Some(3), 1);
    h.monitor.refresh(now());
    assert_eq!(h.notifier.count(), 2);
}

#[test]
fn window_reappearing_clears_crash() {
    let mut h = harness(&[0]);
    write_task(&h.wip, "w", "Implementing", Some(3), 1);

    let board = h.monitor.refresh(now());
    assert_eq!(state_of(&board, "w"), TaskState::Crashed);

    h.liveness.set(live(&[0, 3]));
    let board = h.monitor.refresh(now());
    assert_eq!(state_of(&board, "w"), TaskState::Running);
    assert!(board.rows[0].window_open);
    assert!(h.monitor.registry().is_empty());
}

#[test]
fn unknown_liveness_suppresses_crash() {
    let mut h = harness(&[]);
    h.liveness.set(LivenessSnapshot::unknown());
    write_task(&h.wip, "w", "Implementing", Some(3), 1);

    let board = h.monitor.refresh(now());
    assert!(!board.windows_known);
    assert_eq!(state_of(&board, "w"), TaskState::Running);
    assert_eq!(h.notifier.count(), 0);
}

#[test]
fn switch_to_selects_recorded_window() {
    let mut h = harness(&[0, 1, 2]);
    write_task(&h.wip, "a", "Implementing", Some(2), 1);

    let board = h.monitor.refresh(now());
    let window = h.monitor.switch_to(&board.rows[0]).unwrap();

    assert_eq!(window, 2);
    assert_eq!(*h.tmux.selected.lock().unwrap(), vec![2]);
}

#[test]
fn switch_to_reports_missing_window() {
    let mut h = harness(&[0]);
    write_task(&h.wip, "a", "Implementing", Some(7), 1);
    write_task(&h.wip, "b", "Implementing", None, 1);

    let board = h.monitor.refresh(now());
    let crashed = board.rows.iter().find(|r| r.record.id == "a").unwrap();
    let windowless = board.rows.iter().find(|r| r.record.id == "b").unwrap();

    assert!(matches!(
        h.monitor.switch_to(crashed),
        Err(WipdeckError::WindowNotFound(7))
    ));
    assert!(matches!(
        h.monitor.switch_to(windowless),
        Err(WipdeckError::NoWindowRecorded(_))
    ));
    assert!(h.tmux.selected.lock().unwrap().is_empty());
}
