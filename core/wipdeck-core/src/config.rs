//! Configuration loading and defaults.
//!
//! Handles:
//! - Built-in defaults for every tunable the monitor consumes
//! - The optional settings file (`~/.claude/wipdeck.json`)
//! - Marker sets that drive status classification
//!
//! Precedence is defaults < settings file < CLI flags. The CLI layer applies
//! its flags on top of the `MonitorConfig` returned here.

use crate::error::{Result, WipdeckError};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Subdirectory of the wiki root holding in-progress task files.
pub const WIP_SUBDIR: &str = "wip";

/// Extension of recognized task files.
pub const TASK_EXTENSION: &str = "wiki";

pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_STALE_MINUTES: u64 = 10;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PROCESS_PATTERN: &str = "claude";

const SETTINGS_FILE_NAME: &str = "wipdeck.json";

// ═══════════════════════════════════════════════════════════════════════════════
// Status Markers
// ═══════════════════════════════════════════════════════════════════════════════

/// Text signals matched against a task's status line.
///
/// `completion` and `blocked` are case-insensitive substring matches.
/// `hook_states` are case-insensitive exact matches on the trimmed status,
/// naming the events the lifecycle hook writes when the worker stops for input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMarkers {
    pub completion: Vec<String>,
    pub blocked: Vec<String>,
    pub hook_states: Vec<String>,
}

impl Default for StatusMarkers {
    fn default() -> Self {
        Self {
            completion: to_strings(&["done", "complete", "finished"]),
            blocked: to_strings(&[
                "waiting for",
                "waiting on",
                "blocked",
                "needs review",
                "paused",
                "stuck",
            ]),
            hook_states: to_strings(&[
                "permissionrequest",
                "posttoolusefailure",
                "stop",
                "precompact",
                "sessionend",
            ]),
        }
    }
}

impl StatusMarkers {
    pub fn is_completed(&self, status: &str) -> bool {
        contains_any(status, &self.completion)
    }

    pub fn is_blocked(&self, status: &str) -> bool {
        contains_any(status, &self.blocked)
    }

    pub fn is_hook_state(&self, status: &str) -> bool {
        let status = status.trim();
        !status.is_empty()
            && self
                .hook_states
                .iter()
                .any(|state| state.trim().eq_ignore_ascii_case(status))
    }
}

fn contains_any(status: &str, markers: &[String]) -> bool {
    let status = status.to_lowercase();
    markers
        .iter()
        .map(|marker| marker.to_lowercase())
        .any(|marker| !marker.is_empty() && status.contains(&marker))
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Settings File
// ═══════════════════════════════════════════════════════════════════════════════

/// On-disk settings. Every field is optional; absent fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub wiki_path: Option<String>,
    pub interval_secs: Option<u64>,
    pub stale_minutes: Option<u64>,
    pub notifications: Option<bool>,
    pub process_pattern: Option<String>,
    pub command_timeout_secs: Option<u64>,
    pub markers: Option<StatusMarkers>,
}

/// Returns the path to the settings file (~/.claude/wipdeck.json).
pub fn get_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude").join(SETTINGS_FILE_NAME))
}

/// Loads settings, returning defaults if the file is missing or malformed.
pub fn load_settings() -> Settings {
    match get_settings_path() {
        Some(path) => load_settings_from(&path),
        None => Settings::default(),
    }
}

pub fn load_settings_from(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to read settings; using defaults");
            return Settings::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|err| {
        tracing::warn!(error = %err, path = %path.display(), "Malformed settings; using defaults");
        Settings::default()
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Monitor Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything the refresh cycle needs to know, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub wiki_path: PathBuf,
    pub interval: Duration,
    pub stale_threshold: Duration,
    pub notifications: bool,
    pub markers: StatusMarkers,
    pub process_pattern: String,
    pub command_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            wiki_path: default_wiki_path(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            stale_threshold: Duration::from_secs(DEFAULT_STALE_MINUTES * 60),
            notifications: true,
            markers: StatusMarkers::default(),
            process_pattern: DEFAULT_PROCESS_PATTERN.to_string(),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

impl MonitorConfig {
    /// Applies a settings file on top of the built-in defaults.
    pub fn from_settings(settings: Settings) -> Self {
        let mut config = Self::default();
        if let Some(path) = settings.wiki_path {
            config.wiki_path = expand_home(&path);
        }
        if let Some(secs) = settings.interval_secs {
            config.interval = Duration::from_secs(secs.max(1));
        }
        if let Some(minutes) = settings.stale_minutes {
            config.stale_threshold = Duration::from_secs(minutes.saturating_mul(60));
        }
        if let Some(enabled) = settings.notifications {
            config.notifications = enabled;
        }
        if let Some(pattern) = settings.process_pattern.filter(|p| !p.trim().is_empty()) {
            config.process_pattern = pattern;
        }
        if let Some(secs) = settings.command_timeout_secs {
            config.command_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(markers) = settings.markers {
            config.markers = markers;
        }
        config
    }

    /// The monitored directory: `<wiki_path>/wip`.
    pub fn wip_dir(&self) -> PathBuf {
        self.wiki_path.join(WIP_SUBDIR)
    }

    /// Fails if the wiki root is missing or not a directory.
    pub fn validate(&self) -> Result<()> {
        if !self.wiki_path.exists() {
            return Err(WipdeckError::WikiPathNotFound(self.wiki_path.clone()));
        }
        if !self.wiki_path.is_dir() {
            return Err(WipdeckError::WikiPathNotDirectory(self.wiki_path.clone()));
        }
        Ok(())
    }
}

/// Platform default wiki root (~/vimwiki).
pub fn default_wiki_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("vimwiki"))
        .unwrap_or_else(|| PathBuf::from("vimwiki"))
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
