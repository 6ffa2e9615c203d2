use super::command::run_bounded;
use crate::error::{Result, WipdeckError};
use std::collections::BTreeSet;
use std::time::Duration;

/// Session manager seam: query open windows, switch to one.
pub trait TmuxAdapter: Send + Sync {
    /// Window indices open in the current session.
    fn list_windows(&self) -> Result<BTreeSet<u32>>;

    /// Makes window `index` of the current session active.
    fn select_window(&self, index: u32) -> Result<()>;

    /// Whether this process runs inside a tmux session at all.
    fn is_available(&self) -> bool;
}

/// Returns true when `$TMUX` is set.
pub fn inside_tmux() -> bool {
    std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct CommandTmuxAdapter {
    timeout: Duration,
    in_tmux: bool,
}

impl CommandTmuxAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            in_tmux: inside_tmux(),
        }
    }
}

impl TmuxAdapter for CommandTmuxAdapter {
    fn list_windows(&self) -> Result<BTreeSet<u32>> {
        if !self.in_tmux {
            return Err(WipdeckError::NotInTmux);
        }
        let output = run_bounded(
            "tmux",
            &["list-windows", "-F", "#{window_index}"],
            self.timeout,
        )?;
        Ok(parse_window_indices(&output))
    }

    fn select_window(&self, index: u32) -> Result<()> {
        if !self.in_tmux {
            return Err(WipdeckError::NotInTmux);
        }
        let target = format!(":{}", index);
        run_bounded("tmux", &["select-window", "-t", &target], self.timeout)?;
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.in_tmux
    }
}

fn parse_window_indices(output: &str) -> BTreeSet<u32> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .collect()
}
