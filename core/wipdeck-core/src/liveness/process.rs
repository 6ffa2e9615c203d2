//! Process inspection for worker liveness.
//!
//! Enumerates host processes with `sysinfo` (command lines included) and keeps
//! the ones whose command line mentions the worker pattern.

use sysinfo::{ProcessRefreshKind, System, UpdateKind};

/// A running process that looks like an agent worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProcess {
    pub pid: u32,
    pub command: String,
}

/// Lists worker processes on the host, excluding this process.
pub fn list_worker_processes(pattern: &str) -> Vec<WorkerProcess> {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessRefreshKind::new().with_cmd(UpdateKind::Always));

    let own_pid = sysinfo::get_current_pid().ok().map(|pid| pid.as_u32());
    let processes = sys
        .processes()
        .iter()
        .map(|(pid, process)| (pid.as_u32(), process.cmd().join(" ")));

    filter_workers(processes, pattern, own_pid)
}

/// Keeps processes whose command line contains `pattern` (case-insensitive).
pub fn filter_workers(
    processes: impl IntoIterator<Item = (u32, String)>,
    pattern: &str,
    own_pid: Option<u32>,
) -> Vec<WorkerProcess> {
    let pattern = pattern.to_lowercase();
    let mut workers: Vec<WorkerProcess> = processes
        .into_iter()
        .filter(|(pid, _)| Some(*pid) != own_pid)
        .filter(|(_, command)| !command.is_empty() && command.to_lowercase().contains(&pattern))
        .map(|(pid, command)| WorkerProcess { pid, command })
        .collect();
    workers.sort_by_key(|worker| worker.pid);
    workers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_workers_matches_pattern_case_insensitively() {
        let processes = vec![
            (10, "/usr/bin/Claude --task /w/wip/a.wiki".to_string()),
            (11, "vim /w/wip/a.wiki".to_string()),
            (12, "node claude-cli".to_string()),
        ];
        let workers = filter_workers(processes, "claude", None);
        let pids: Vec<_> = workers.iter().map(|w| w.pid).collect();
        assert_eq!(pids, vec![10, 12]);
    }

    #[test]
    fn filter_workers_excludes_own_pid_and_empty_commands() {
        let processes = vec![
            (1, "claude".to_string()),
            (2, String::new()),
            (3, "wipdeck --watch claude".to_string()),
        ];
        let workers = filter_workers(processes, "claude", Some(3));
        assert_eq!(
            workers,
            vec![WorkerProcess {
                pid: 1,
                command: "claude".to_string()
            }]
        );
    }
}
