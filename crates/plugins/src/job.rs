// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform job lifecycle every plugin implements.

use crate::error::PluginError;
use async_trait::async_trait;
use pbatch_core::JobState;
use std::path::Path;

/// A submitted (or not-yet-submitted) computational job.
///
/// `jobid() == "" ⇔` the job has never been submitted, in which case
/// `state` returns [`JobState::Created`] and `wait`/`cancel` are no-ops —
/// every implementation must apply that short-circuit before doing any
/// real work.
#[async_trait]
pub trait Job: Send + Sync {
    /// The plugin-assigned handle, or `""` before `submit` succeeds.
    fn jobid(&self) -> &str;

    /// Materialize the job on its execution side and record its jobid.
    async fn submit(&mut self) -> Result<(), PluginError>;

    /// Derive the current portable state from external evidence (a live
    /// pid, a batch-manager query, or filesystem artifacts).
    async fn state(&self) -> Result<JobState, PluginError>;

    /// Block until `state()` is terminal (`FINISHED` or `FAILED`).
    async fn wait(&self) -> Result<(), PluginError>;

    /// Request termination. A job that is already gone is not an error.
    async fn cancel(&self) -> Result<(), PluginError>;

    /// The persisted exit code, or `None` if it can't be read or parsed.
    async fn exit_code(&self) -> Option<i32>;

    /// Contents of `logs/output.log`.
    async fn stdout(&self) -> Result<String, PluginError>;

    /// Contents of `logs/error.log`.
    async fn stderr(&self) -> Result<String, PluginError>;

    /// Copy `entries` (relative to `work_directory` unless absolute) into
    /// `local_dir`.
    async fn get(&self, entries: &[&str], local_dir: &Path) -> Result<(), PluginError>;
}

/// The `jobid == "" ⇔ CREATED` short-circuit shared by every plugin's
/// `state`/`wait`/`cancel`.
pub(crate) fn created_if_empty(jobid: &str) -> Option<JobState> {
    jobid.is_empty().then_some(JobState::Created)
}
