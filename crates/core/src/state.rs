// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The portable job state machine shared by every plugin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portable job state. Not every plugin emits every variant: the local and
/// no-batch plugins never emit `Queued`/`Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Created,
    InProcess,
    Queued,
    Running,
    Paused,
    Finished,
    Failed,
}

impl JobState {
    /// The exact wire string used by the daemonizer CLI and the Slurm
    /// prefix table (§4.C, §4.F of the design).
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Created => "CREATED",
            JobState::InProcess => "IN_PROCESS",
            JobState::Queued => "QUEUED",
            JobState::Running => "RUNNING",
            JobState::Paused => "PAUSED",
            JobState::Finished => "FINISHED",
            JobState::Failed => "FAILED",
        }
    }

    /// True once the job will not transition further.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the terminal state from the persisted `logs/exit_code.log`
/// contents, per the invariant in §3: content `"0"` is `FINISHED`, any other
/// content is `FAILED`.
pub fn state_from_exit_code_log(contents: &str) -> JobState {
    if contents.trim() == "0" {
        JobState::Finished
    } else {
        JobState::Failed
    }
}

/// Parse the exit code recorded in `logs/exit_code.log`. Negative values
/// indicate termination by signal (e.g. `-15` for `SIGTERM`).
pub fn parse_exit_code(contents: &str) -> Option<i32> {
    contents.trim().parse().ok()
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
