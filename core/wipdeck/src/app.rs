//! Dashboard state machine and the render/input loop.
//!
//! ```text
//! Idle ─> Refreshing ─> Rendering ─> Waiting ─┬─> Refreshing (timer or `r`)
//!                                             ├─> Rendering  (key, resize, message expiry)
//!                                             └─> Exited     (quit key or signal)
//! ```

use crate::terminal::Tui;
use crate::ui;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use wipdeck_core::{Board, Monitor};

/// Upper bound on one `event::poll` so the shutdown flag is seen promptly.
const POLL_SLICE: Duration = Duration::from_millis(250);
const MESSAGE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Waiting,
    Refreshing,
    Rendering,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    /// Zero-based visible row.
    SwitchTo(usize),
    SwitchSelected,
    SelectNext,
    SelectPrevious,
    Ignore,
}

pub fn map_key(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::Ignore,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char(c @ '1'..='9') => Action::SwitchTo(c as usize - '1' as usize),
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Enter => Action::SwitchSelected,
        _ => Action::Ignore,
    }
}

pub struct App {
    monitor: Monitor,
    board: Option<Board>,
    selected: usize,
    message: Option<(String, Instant)>,
    phase: Phase,
    next_refresh: Instant,
    interval: Duration,
}

impl App {
    pub fn new(monitor: Monitor) -> Self {
        let interval = monitor.config().interval;
        Self {
            monitor,
            board: None,
            selected: 0,
            message: None,
            phase: Phase::Idle,
            next_refresh: Instant::now(),
            interval,
        }
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn can_switch_windows(&self) -> bool {
        self.monitor.can_switch_windows()
    }

    /// The transient footer message, if it has not expired.
    pub fn message(&self) -> Option<&str> {
        match &self.message {
            Some((text, until)) if Instant::now() < *until => Some(text.as_str()),
            _ => None,
        }
    }

    fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), Instant::now() + MESSAGE_TTL));
    }

    fn message_expired(&self) -> bool {
        matches!(&self.message, Some((_, until)) if Instant::now() >= *until)
    }

    /// Runs one cycle and restarts the interval timer.
    pub fn refresh(&mut self) {
        self.phase = Phase::Refreshing;
        let now = chrono::Local::now().naive_local();
        let board = self.monitor.refresh(now);
        if self.selected >= board.rows.len() {
            self.selected = board.rows.len().saturating_sub(1);
        }
        self.board = Some(board);
        self.next_refresh = Instant::now() + self.interval;
    }

    fn until_refresh(&self) -> Duration {
        self.next_refresh.saturating_duration_since(Instant::now())
    }

    fn row_count(&self) -> usize {
        self.board.as_ref().map(|b| b.rows.len()).unwrap_or(0)
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.phase = Phase::Exited,
            Action::Refresh => {
                self.refresh();
                self.set_message("Refreshed");
            }
            Action::SwitchTo(index) => self.switch_to(index),
            Action::SwitchSelected => self.switch_to(self.selected),
            Action::SelectNext => {
                if self.selected + 1 < self.row_count() {
                    self.selected += 1;
                }
            }
            Action::SelectPrevious => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::Ignore => {}
        }
    }

    fn switch_to(&mut self, index: usize) {
        if !self.monitor.can_switch_windows() {
            self.set_message("Window switching disabled: not inside tmux");
            return;
        }
        let row = match self.board.as_ref().and_then(|b| b.rows.get(index)) {
            Some(row) => row,
            None => {
                self.set_message(format!("No task #{}", index + 1));
                return;
            }
        };
        let name = row.record.name.clone();
        let result = self.monitor.switch_to(row);
        self.selected = index;
        match result {
            Ok(window) => self.set_message(format!("Switched to window {} ({})", window, name)),
            Err(err) => {
                tracing::warn!(task = %name, error = %err, "Window switch failed");
                self.set_message(format!("Error: {}", err));
            }
        }
    }
}

/// Consecutive terminal I/O failures tolerated before the loop gives up.
const MAX_IO_FAILURES: u32 = 5;

/// Counts back-to-back terminal I/O errors. A transient failure is logged and
/// skipped; a run of them means the terminal is gone.
#[derive(Debug, Default)]
struct IoFailures {
    consecutive: u32,
}

impl IoFailures {
    fn record(&mut self, op: &str, err: io::Error) -> io::Result<()> {
        self.consecutive += 1;
        tracing::warn!(op, error = %err, consecutive = self.consecutive, "Terminal I/O failed");
        if self.consecutive >= MAX_IO_FAILURES {
            return Err(err);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

/// Drives the dashboard until a quit key or shutdown signal.
pub fn run(terminal: &mut Tui, app: &mut App, shutdown: &AtomicBool) -> io::Result<()> {
    let mut failures = IoFailures::default();
    app.refresh();
    loop {
        app.phase = Phase::Rendering;
        match terminal.draw(|frame| ui::render(frame, app)) {
            Ok(_) => failures.reset(),
            Err(err) => failures.record("draw", err)?,
        }
        app.phase = Phase::Waiting;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!("Shutdown signal received");
                app.phase = Phase::Exited;
                return Ok(());
            }

            let remaining = app.until_refresh();
            if remaining.is_zero() {
                app.refresh();
                break;
            }
            if app.message_expired() {
                app.message = None;
                break;
            }

            let ready = match event::poll(remaining.min(POLL_SLICE)) {
                Ok(ready) => ready,
                Err(err) => {
                    failures.record("poll", err)?;
                    std::thread::sleep(POLL_SLICE);
                    continue;
                }
            };
            if !ready {
                continue;
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    failures.reset();
                    app.apply(map_key(key));
                    break;
                }
                Ok(Event::Resize(..)) => break,
                Ok(_) => failures.reset(),
                Err(err) => failures.record("read", err)?,
            }
        }

        if app.phase == Phase::Exited {
            return Ok(());
        }
    }
}
