// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Querying and controlling a submitted job by PID, from outside the
//! daemonized process tree.

use crate::workdir::WorkdirPaths;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use pbatch_core::{state_from_exit_code_log, JobState};
use std::path::Path;
use std::time::Duration;

/// Is a process with this pid currently alive? Uses a zero-signal send,
/// the same probe the original shell-based daemonizer relies on.
pub fn process_exists(pid: i32) -> bool {
    signal::kill(Pid::from_raw(pid), None).is_ok()
}

/// Read and parse `logs/exit_code.log`. Absence or malformed content both
/// mean "no exit code is available" rather than an error: callers treat
/// that as `FAILED`.
pub fn read_exit_code(work_directory: &Path) -> Option<i32> {
    let path = WorkdirPaths::for_workdir(work_directory).exit_code_log;
    pbatch_core::parse_exit_code(&std::fs::read_to_string(path).ok()?)
}

/// `RUNNING` while the pid is alive; otherwise derived from `exit_code.log`
/// (`"0"` ⇒ `FINISHED`, anything else, including absence, ⇒ `FAILED`).
pub fn state(pid: i32, work_directory: &Path) -> JobState {
    if process_exists(pid) {
        return JobState::Running;
    }
    let path = WorkdirPaths::for_workdir(work_directory).exit_code_log;
    match std::fs::read_to_string(path) {
        Ok(contents) => state_from_exit_code_log(&contents),
        Err(_) => JobState::Failed,
    }
}

/// Poll pid existence until it disappears.
pub fn wait_for_exit(pid: i32, poll_interval: Duration) {
    while process_exists(pid) {
        std::thread::sleep(poll_interval);
    }
}

/// Send SIGTERM. A process that is already gone is not an error — the
/// caller only wants the job terminated, and it already is.
pub fn cancel(pid: i32) -> std::io::Result<()> {
    match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
