//! Compiled regex patterns for parsing task files.
//!
//! Compiled once on first use. Update these when the task template or the
//! hook that writes status fields changes its line format.

use once_cell::sync::Lazy;
use regex::Regex;

// ═══════════════════════════════════════════════════════════════════════════════
// Task Field Regexes
// ═══════════════════════════════════════════════════════════════════════════════

pub static RE_TASK_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^# Task Name:\s*(.+)").unwrap());
pub static RE_STATUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\*Status\*\*:\s*(.+)").unwrap());
pub static RE_TMUX_WINDOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*Tmux Window\*\*:\s*(\d+)").unwrap());
pub static RE_LAST_UPDATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*Last Updated Date/Time\*\*:\s*(.+)").unwrap());

// ═══════════════════════════════════════════════════════════════════════════════
// Checklist Regexes
// ═══════════════════════════════════════════════════════════════════════════════

pub static RE_CHECKBOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- \[[xXoO ]\]").unwrap());
pub static RE_CHECKBOX_DONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- \[[xX]\]").unwrap());

// ═══════════════════════════════════════════════════════════════════════════════
// Timestamp Regexes
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordinal day suffix, e.g. the `th` in `14th`.
pub static RE_ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)\b").unwrap());
