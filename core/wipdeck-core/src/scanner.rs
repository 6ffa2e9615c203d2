//! Task store scanning.
//!
//! Reads every `*.wiki` file directly inside the monitored directory and
//! parses it into an immutable [`TaskRecord`]. Each call builds a brand-new
//! snapshot; nothing is carried over from a previous scan.
//!
//! Parsing is line-oriented and forgiving: each field is extracted on its own
//! and a missing field only defaults that field. A file that cannot be read
//! (permissions, removed mid-scan) is skipped and picked up again next cycle.

use crate::config::TASK_EXTENSION;
use crate::error::{Result, WipdeckError};
use crate::patterns::{
    RE_CHECKBOX, RE_CHECKBOX_DONE, RE_LAST_UPDATED, RE_STATUS, RE_TASK_NAME, RE_TMUX_WINDOW,
};
use crate::timestamp::parse_timestamp;
use chrono::NaiveDateTime;
use fs_err as fs;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Checklist progress (`- [x]` lines over all checklist lines).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub done: u32,
    pub total: u32,
}

/// One task file as read during a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// File stem, stable across cycles.
    pub id: String,
    pub file_path: PathBuf,
    /// `# Task Name:` heading, or the id when absent.
    pub name: String,
    /// `**Status**:` value; empty when absent.
    pub status_text: String,
    /// `**Last Updated Date/Time**:` value; `None` means unknown age.
    pub last_updated: Option<NaiveDateTime>,
    /// `**Tmux Window**:` index within the current session.
    pub session_window_ref: Option<u32>,
    pub progress: Progress,
}

/// Parses task file content. Never fails; absent fields are defaulted.
pub fn parse_task_content(
    id: &str,
    file_path: &Path,
    content: &str,
    now: NaiveDateTime,
) -> TaskRecord {
    let lines: Vec<&str> = content.lines().collect();

    let mut progress = Progress::default();
    for line in &lines {
        if RE_CHECKBOX.is_match(line) {
            progress.total += 1;
        }
        if RE_CHECKBOX_DONE.is_match(line) {
            progress.done += 1;
        }
    }

    TaskRecord {
        id: id.to_string(),
        file_path: file_path.to_path_buf(),
        name: first_capture(&lines, &RE_TASK_NAME).unwrap_or_else(|| id.to_string()),
        status_text: first_capture(&lines, &RE_STATUS).unwrap_or_default(),
        last_updated: first_capture(&lines, &RE_LAST_UPDATED)
            .and_then(|raw| parse_timestamp(&raw, now)),
        session_window_ref: first_capture(&lines, &RE_TMUX_WINDOW)
            .and_then(|raw| raw.parse().ok()),
        progress,
    }
}

fn first_capture(lines: &[&str], pattern: &Regex) -> Option<String> {
    lines.iter().find_map(|line| {
        pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Reads and parses a single task file.
pub fn read_task_file(path: &Path, now: NaiveDateTime) -> Result<TaskRecord> {
    let bytes = fs::read(path).map_err(|err| WipdeckError::io("reading task file", err))?;
    let content = String::from_utf8_lossy(&bytes);
    let id = task_id(path);
    Ok(parse_task_content(&id, &absolute_path(path), &content, now))
}

/// Makes a path absolute without resolving symlinks, so it still matches the
/// path a worker was launched with.
fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn task_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn is_task_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == TASK_EXTENSION)
        .unwrap_or(false)
}

/// Scans the monitored directory, returning one record per readable task file
/// in file-name order. A missing directory yields an empty scan.
pub fn scan_tasks(dir: &Path, now: NaiveDateTime) -> Vec<TaskRecord> {
    if !dir.is_dir() {
        tracing::debug!(path = %dir.display(), "Monitored directory missing; empty scan");
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_task_file(entry.path()))
        .filter_map(|entry| match read_task_file(entry.path(), now) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, path = %entry.path().display(), "Skipping task file this cycle");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-02-14 20:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    const FULL_TASK: &str = "\
# Task Name: Fix login redirect

**Status**: Implementing
**Tmux Window**: 3
**Last Updated Date/Time**: Saturday 14 February 2026 19:30:55

## Plan
- [x] reproduce
- [X] write failing test
- [ ] fix
- [o] partial thing
";

    #[test]
    fn test_parse_full_task() {
        let record = parse_task_content("fix-login", Path::new("/w/wip/fix-login.wiki"), FULL_TASK, now());
        assert_eq!(record.id, "fix-login");
        assert_eq!(record.name, "Fix login redirect");
        assert_eq!(record.status_text, "Implementing");
        assert_eq!(record.session_window_ref, Some(3));
        assert_eq!(
            record.last_updated.map(|t| t.to_string()),
            Some("2026-02-14 19:30:55".to_string())
        );
        assert_eq!(record.progress, Progress { done: 2, total: 4 });
    }

    #[test]
    fn test_missing_fields_default() {
        let record = parse_task_content("bare", Path::new("/w/wip/bare.wiki"), "just notes\n", now());
        assert_eq!(record.name, "bare");
        assert_eq!(record.status_text, "");
        assert_eq!(record.session_window_ref, None);
        assert_eq!(record.last_updated, None);
        assert_eq!(record.progress, Progress::default());
    }

    #[test]
    fn test_first_matching_line_wins() {
        let content = "**Status**: first\n**Status**: second\n";
        let record = parse_task_content("t", Path::new("t.wiki"), content, now());
        assert_eq!(record.status_text, "first");
    }

    #[test]
    fn test_non_numeric_window_is_ignored() {
        let content = "**Tmux Window**: [window]\n";
        let record = parse_task_content("t", Path::new("t.wiki"), content, now());
        assert_eq!(record.session_window_ref, None);
    }

    #[test]
    fn test_indented_field_is_not_recognized() {
        let content = "  **Status**: hidden\n";
        let record = parse_task_content("t", Path::new("t.wiki"), content, now());
        assert_eq!(record.status_text, "");
    }

    #[test]
    fn test_scan_reads_only_wiki_files_in_order() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("b-task.wiki"), "**Status**: B\n").unwrap();
        fs::write(dir.join("a-task.wiki"), "**Status**: A\n").unwrap();
        fs::write(dir.join("notes.md"), "**Status**: ignored\n").unwrap();
        fs::create_dir(dir.join("nested.wiki")).unwrap();
        fs::create_dir(dir.join("archive")).unwrap();
        fs::write(dir.join("archive").join("old.wiki"), "**Status**: old\n").unwrap();

        let records = scan_tasks(dir, now());
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a-task", "b-task"]);
        assert!(records.iter().all(|r| r.file_path.is_absolute()));
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(scan_tasks(&temp.path().join("wip"), now()).is_empty());
    }

    #[test]
    fn test_invalid_utf8_still_yields_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("garbled.wiki");
        let mut bytes = b"**Status**: Implementing\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        fs::write(&path, bytes).unwrap();

        let records = scan_tasks(temp.path(), now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status_text, "Implementing");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked.wiki");
        fs::write(&locked, "**Status**: secret\n").unwrap();
        fs::write(temp.path().join("open.wiki"), "**Status**: open\n").unwrap();
        fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let records = scan_tasks(temp.path(), now());
        // Root can still read mode-000 files; only assert the open one is present.
        assert!(records.iter().any(|r| r.id == "open"));
        if fs::read(&locked).is_err() {
            assert_eq!(records.len(), 1);
        }

        fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
    }
}
