//! Desktop notification sink.
//!
//! Notifications are fire-and-forget: the alert registry logs a failed
//! delivery and moves on. Uses `osascript` on macOS and `notify-send`
//! elsewhere, both bounded by the command runner.

use crate::alerts::IssueKind;
use crate::error::Result;
use crate::liveness::run_bounded;
use std::time::Duration;

pub const NOTIFICATION_TITLE: &str = "Task Manager";

/// One alert to surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub task_id: String,
    pub task_name: String,
    pub kind: IssueKind,
    pub reason: Option<String>,
}

impl Notification {
    /// Body text, e.g. `CRASHED (window 3 closed)`.
    pub fn message(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{} ({})", self.kind.label(), reason),
            None => self.kind.label().to_string(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Platform desktop notifications.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    timeout: Duration,
}

impl DesktopNotifier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let message = notification.message();
        if cfg!(target_os = "macos") {
            let script = format!(
                r#"display notification "{}" with title "{}" subtitle "{}""#,
                escape_applescript(&message),
                escape_applescript(NOTIFICATION_TITLE),
                escape_applescript(&notification.task_name),
            );
            run_bounded("osascript", &["-e", &script], self.timeout)?;
        } else {
            let summary = format!("{}: {}", NOTIFICATION_TITLE, notification.task_name);
            run_bounded(
                "notify-send",
                &["--app-name=wipdeck", &summary, &message],
                self.timeout,
            )?;
        }
        Ok(())
    }
}

/// Headless mode: accepts and drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::debug!(task = %notification.task_id, kind = ?notification.kind, "Notification suppressed");
        Ok(())
    }
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_applescript_quotes_and_backslashes() {
        assert_eq!(escape_applescript(r#"say "hi" \ bye"#), r#"say \"hi\" \\ bye"#);
    }

    #[test]
    fn message_includes_reason_when_present() {
        let mut n = Notification {
            task_id: "t".to_string(),
            task_name: "Task".to_string(),
            kind: IssueKind::Crashed,
            reason: Some("window 3 closed".to_string()),
        };
        assert_eq!(n.message(), "CRASHED (window 3 closed)");
        n.reason = None;
        assert_eq!(n.message(), "CRASHED");
    }

    #[test]
    fn null_notifier_always_succeeds() {
        let n = Notification {
            task_id: "t".to_string(),
            task_name: "Task".to_string(),
            kind: IssueKind::Stale,
            reason: None,
        };
        assert!(NullNotifier.notify(&n).is_ok());
    }
}
