// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `nobatch` plugin: drives the remote daemonizer (§4.C) over a
//! [`Transport`] to run jobs on an unmanaged remote host.

use crate::error::PluginError;
use crate::job::{created_if_empty, Job};
use async_trait::async_trait;
use pbatch_core::{is_absolute, path_join, slurm_time_to_seconds, JobState, LaunchParameters};
use pbatch_transport::Transport;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_REMOTE_MANAGER: &str = "pbatchd";
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The fields of a [`NobatchJob`] that survive serialization. The live
/// `Transport` does not — reconstructing a handle means pairing this with
/// a freshly built (or separately deserialized) `Transport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NobatchJobSnapshot {
    pub launch: LaunchParameters,
    pub jobid: String,
    pub remote_manager_path: String,
}

/// A job submitted to an unmanaged remote host via the daemonizer binary.
pub struct NobatchJob {
    launch: LaunchParameters,
    jobid: String,
    /// Path to the daemonizer binary, relative to `work_directory`, after
    /// it has been uploaded there.
    remote_manager_path: String,
    /// Local path to the compiled daemonizer binary to ship alongside
    /// `input_files`. Not needed once `submit` has run.
    local_daemonizer_binary: Option<PathBuf>,
    transport: Arc<dyn Transport>,
}

impl NobatchJob {
    pub fn new(launch: LaunchParameters, transport: Arc<dyn Transport>, local_daemonizer_binary: PathBuf) -> Self {
        Self {
            launch,
            jobid: String::new(),
            remote_manager_path: DEFAULT_REMOTE_MANAGER.to_string(),
            local_daemonizer_binary: Some(local_daemonizer_binary),
            transport,
        }
    }

    /// Override the launch prefix for the daemonizer entry point, mirroring
    /// the original implementation's `remote_python_exe` parameter.
    pub fn with_remote_manager_path(mut self, path: impl Into<String>) -> Self {
        self.remote_manager_path = path.into();
        self
    }

    pub fn snapshot(&self) -> NobatchJobSnapshot {
        NobatchJobSnapshot {
            launch: self.launch.clone(),
            jobid: self.jobid.clone(),
            remote_manager_path: self.remote_manager_path.clone(),
        }
    }

    /// Rebuild a handle from a snapshot plus a live `Transport`. The
    /// rebuilt handle cannot `submit` again (there is no local daemonizer
    /// binary to ship), only track/cancel/fetch an already-submitted job.
    pub fn from_snapshot(snapshot: NobatchJobSnapshot, transport: Arc<dyn Transport>) -> Self {
        Self {
            launch: snapshot.launch,
            jobid: snapshot.jobid,
            remote_manager_path: snapshot.remote_manager_path,
            local_daemonizer_binary: None,
            transport,
        }
    }

    fn remote_path(&self, parts: &[&str]) -> String {
        path_join(&self.launch.work_directory, parts, self.launch.is_posix)
    }

    fn remote_manager_invocation(&self) -> String {
        self.remote_path(&[&self.remote_manager_path])
    }

    fn wall_time_secs(&self) -> Result<Option<String>, PluginError> {
        let secs = slurm_time_to_seconds(&self.launch.wall_time)?;
        Ok((!secs.is_empty()).then_some(secs))
    }
}

#[async_trait]
impl Job for NobatchJob {
    fn jobid(&self) -> &str {
        &self.jobid
    }

    async fn submit(&mut self) -> Result<(), PluginError> {
        let logs_dir = self.remote_path(&["logs"]);
        if self.launch.is_posix {
            self.transport.run(&to_argv(["mkdir", "-p", &logs_dir])).await?;
        }

        let daemonizer = self
            .local_daemonizer_binary
            .clone()
            .ok_or_else(|| PluginError::SubmitFailed("no local daemonizer binary configured".into()))?;
        let mut entries: Vec<&Path> = self.launch.input_files.iter().map(PathBuf::as_path).collect();
        entries.push(daemonizer.as_path());
        self.transport.upload(&entries, &self.launch.work_directory).await?;

        let mut argv = vec![
            self.remote_manager_invocation(),
            "submit".to_string(),
            self.launch.work_directory.clone(),
        ];
        if let Some(secs) = self.wall_time_secs()? {
            argv.push("--wall_time".to_string());
            argv.push(secs);
        }
        if self.launch.create_nodefile && self.launch.ntasks > 0 {
            argv.push("--ntasks".to_string());
            argv.push(self.launch.ntasks.to_string());
        }
        if self.launch.total_jobs > 1 {
            argv.push("--total_jobs".to_string());
            argv.push(self.launch.total_jobs.to_string());
        }
        if self.launch.max_simul_jobs > 1 {
            argv.push("--max_simul_jobs".to_string());
            argv.push(self.launch.max_simul_jobs.to_string());
        }
        argv.extend(self.launch.command.clone());

        let out = self.transport.run(&argv).await?;
        let stdout = String::from_utf8_lossy(&out);
        let jobid = stdout.trim();
        let parsed: i64 = jobid.parse().map_err(|_| PluginError::SubmitFailed(jobid.to_string()))?;
        info!(jobid = parsed, host = %self.launch.work_directory, "nobatch job submitted");
        self.jobid = parsed.to_string();
        Ok(())
    }

    async fn state(&self) -> Result<JobState, PluginError> {
        if let Some(state) = created_if_empty(&self.jobid) {
            return Ok(state);
        }
        let mut argv = vec![self.remote_manager_invocation()];
        argv.extend(to_argv(["state", &self.jobid, &self.launch.work_directory]));
        let out = self.transport.run(&argv).await?;
        let printed = String::from_utf8_lossy(&out).trim().to_string();
        match printed.as_str() {
            "RUNNING" => Ok(JobState::Running),
            "FINISHED" => Ok(JobState::Finished),
            "FAILED" => Ok(JobState::Failed),
            other => {
                warn!(jobid = %self.jobid, printed = other, "unrecognized daemonizer state output");
                Ok(JobState::Failed)
            }
        }
    }

    async fn wait(&self) -> Result<(), PluginError> {
        if created_if_empty(&self.jobid).is_some() {
            return Ok(());
        }
        loop {
            if self.state().await?.is_terminal() {
                return Ok(());
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn cancel(&self) -> Result<(), PluginError> {
        if created_if_empty(&self.jobid).is_some() {
            return Ok(());
        }
        let mut argv = vec![self.remote_manager_invocation()];
        argv.extend(to_argv(["cancel", &self.jobid]));
        self.transport.run(&argv).await?;
        Ok(())
    }

    async fn exit_code(&self) -> Option<i32> {
        let path = self.remote_path(&["logs", "exit_code.log"]);
        let contents = self.transport.read(&path).await.ok()?;
        pbatch_core::parse_exit_code(&contents)
    }

    async fn stdout(&self) -> Result<String, PluginError> {
        self.transport.read(&self.remote_path(&["logs", "output.log"])).await.map_err(Into::into)
    }

    async fn stderr(&self) -> Result<String, PluginError> {
        self.transport.read(&self.remote_path(&["logs", "error.log"])).await.map_err(Into::into)
    }

    async fn get(&self, entries: &[&str], local_dir: &Path) -> Result<(), PluginError> {
        let resolved: Vec<String> = entries
            .iter()
            .map(|entry| {
                if is_absolute(entry, self.launch.is_posix) {
                    (*entry).to_string()
                } else {
                    self.remote_path(&[entry])
                }
            })
            .collect();
        let refs: Vec<&str> = resolved.iter().map(String::as_str).collect();
        self.transport.download(&refs, local_dir).await.map_err(Into::into)
    }
}

fn to_argv<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
#[path = "nobatch_tests.rs"]
mod tests;
