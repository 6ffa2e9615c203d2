//! Bounded execution of external commands.
//!
//! Every shell-out from the refresh loop goes through [`run_bounded`] so a
//! hung `tmux` or notifier cannot freeze the dashboard.

use crate::error::{Result, WipdeckError};
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Runs `program args…`, returning its stdout if it exits successfully
/// within `timeout`. On timeout the child is killed.
///
/// The stdout reader is never joined: a grandchild that inherited the pipe
/// can keep it open after the child is gone. The reader hands its buffer over
/// a channel instead, and is left detached if it misses the deadline.
pub fn run_bounded(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let command_line = describe(program, args);
    let started = Instant::now();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| WipdeckError::CommandFailed {
            command: command_line.clone(),
            details: err.to_string(),
        })?;

    // Drain stdout concurrently so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stdout) = stdout {
            let _ = stdout.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WipdeckError::CommandTimedOut {
                command: command_line,
                timeout,
            });
        }
        Err(err) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WipdeckError::CommandFailed {
                command: command_line,
                details: format!("wait failed: {}", err),
            });
        }
    };

    let remaining = timeout.saturating_sub(started.elapsed());
    let output = match rx.recv_timeout(remaining) {
        Ok(output) => output,
        Err(mpsc::RecvTimeoutError::Disconnected) => Vec::new(),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            return Err(WipdeckError::CommandTimedOut {
                command: command_line,
                timeout,
            });
        }
    };

    if !status.success() {
        return Err(WipdeckError::CommandFailed {
            command: command_line,
            details: format!("exited with {}", status),
        });
    }

    Ok(String::from_utf8_lossy(&output).to_string())
}

fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
