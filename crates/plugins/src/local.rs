// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `local` plugin: runs the job in-process via [`pbatch_daemon`], with
//! no transport involved.

use crate::error::PluginError;
use crate::job::{created_if_empty, Job};
use async_trait::async_trait;
use pbatch_core::{is_absolute, slurm_time_to_seconds, JobState, LaunchParameters};
use pbatch_daemon::{JobSpec, WorkdirPaths};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A job driven entirely in-process: `submit` double-forks directly, and
/// every other operation reads back filesystem/pid state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalJob {
    launch: LaunchParameters,
    jobid: String,
}

impl LocalJob {
    pub fn new(launch: LaunchParameters) -> Self {
        Self { launch, jobid: String::new() }
    }

    fn work_directory(&self) -> PathBuf {
        PathBuf::from(&self.launch.work_directory)
    }

    fn pid(&self) -> Option<i32> {
        self.jobid.parse().ok()
    }
}

#[async_trait]
impl Job for LocalJob {
    fn jobid(&self) -> &str {
        &self.jobid
    }

    async fn submit(&mut self) -> Result<(), PluginError> {
        let wall_time_secs = parse_wall_time(&self.launch.wall_time)?;
        let spec = JobSpec {
            command: self.launch.command.clone(),
            work_directory: self.work_directory(),
            wall_time_secs,
            ntasks: if self.launch.create_nodefile { self.launch.ntasks } else { 0 },
            total_jobs: self.launch.total_jobs.max(1),
            max_simul_jobs: self.launch.max_simul_jobs.max(1),
        };
        let pid = blocking(move || pbatch_daemon::submit(spec).map_err(PluginError::from)).await?;
        info!(pid, work_directory = %self.launch.work_directory, "local job submitted");
        self.jobid = pid.to_string();
        Ok(())
    }

    async fn state(&self) -> Result<JobState, PluginError> {
        if let Some(state) = created_if_empty(&self.jobid) {
            return Ok(state);
        }
        let Some(pid) = self.pid() else {
            warn!(jobid = %self.jobid, "local job id is not a pid");
            return Ok(JobState::Failed);
        };
        let work_directory = self.work_directory();
        blocking(move || Ok(pbatch_daemon::state(pid, &work_directory))).await
    }

    async fn wait(&self) -> Result<(), PluginError> {
        if created_if_empty(&self.jobid).is_some() {
            return Ok(());
        }
        let Some(pid) = self.pid() else { return Ok(()) };
        blocking(move || {
            pbatch_daemon::wait_for_exit(pid, POLL_INTERVAL);
            Ok(())
        })
        .await
    }

    async fn cancel(&self) -> Result<(), PluginError> {
        if created_if_empty(&self.jobid).is_some() {
            return Ok(());
        }
        let Some(pid) = self.pid() else { return Ok(()) };
        blocking(move || pbatch_daemon::cancel(pid).map_err(PluginError::from)).await
    }

    async fn exit_code(&self) -> Option<i32> {
        pbatch_daemon::read_exit_code(&self.work_directory())
    }

    async fn stdout(&self) -> Result<String, PluginError> {
        let path = WorkdirPaths::for_workdir(&self.work_directory()).output_log;
        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }

    async fn stderr(&self) -> Result<String, PluginError> {
        let path = WorkdirPaths::for_workdir(&self.work_directory()).error_log;
        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }

    async fn get(&self, entries: &[&str], local_dir: &Path) -> Result<(), PluginError> {
        let base = self.work_directory();
        for entry in entries {
            let source = if is_absolute(entry, true) {
                PathBuf::from(entry)
            } else {
                base.join(entry)
            };
            let file_name = Path::new(entry)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(entry));
            copy_recursive(&source, &local_dir.join(file_name)).await?;
        }
        Ok(())
    }
}

fn parse_wall_time(wall_time: &str) -> Result<Option<u64>, PluginError> {
    let seconds = slurm_time_to_seconds(wall_time)?;
    if seconds.is_empty() {
        return Ok(None);
    }
    Ok(seconds.parse().ok())
}

/// Run a blocking `pbatch_daemon` call without stalling the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, PluginError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PluginError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PluginError::Io(io::Error::other(e.to_string())))?
}

fn copy_recursive<'a>(
    source: &'a Path,
    dest: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let metadata = tokio::fs::metadata(source).await?;
        if metadata.is_dir() {
            tokio::fs::create_dir_all(dest).await?;
            let mut entries = tokio::fs::read_dir(source).await?;
            while let Some(entry) = entries.next_entry().await? {
                let child_dest = dest.join(entry.file_name());
                copy_recursive(&entry.path(), &child_dest).await?;
            }
            Ok(())
        } else {
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(source, dest).await.map(|_| ())
        }
    })
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
