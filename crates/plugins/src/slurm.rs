// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `slurm` plugin: generates a batch script and drives it through
//! `sbatch`/`squeue`/`sacct`/`scancel` over a [`Transport`].

use crate::error::PluginError;
use crate::job::{created_if_empty, Job};
use async_trait::async_trait;
use pbatch_core::{is_absolute, path_join, JobState, LaunchParameters};
use pbatch_transport::Transport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Longest-prefix, case-sensitive map from `squeue`/`sacct` state strings
/// to the portable state machine.
const STATE_PREFIXES: &[(&str, JobState)] = &[
    ("COMPLETED", JobState::Finished),
    ("CONFIGURI", JobState::Running),
    ("RUNNING", JobState::Running),
    ("PENDING", JobState::Queued),
    ("RESV_DEL_", JobState::Paused),
    ("REQUEUE", JobState::Paused),
    ("RESIZING", JobState::Paused),
    ("SUSPENDED", JobState::Paused),
    ("BOOT_FAIL", JobState::Failed),
    ("CANCELLED", JobState::Failed),
    ("DEADLINE", JobState::Failed),
    ("FAILED", JobState::Failed),
    ("NODE_FAIL", JobState::Failed),
    ("OUT_OF_ME", JobState::Failed),
    ("PREEMPTED", JobState::Failed),
    ("REVOKED", JobState::Failed),
    ("SIGNALING", JobState::Failed),
    ("SPECIAL_E", JobState::Failed),
    ("STAGE_OUT", JobState::Failed),
    ("STOPPED", JobState::Failed),
    ("TIMEOUT", JobState::Failed),
];

fn map_state_prefix(raw: &str) -> Option<JobState> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    STATE_PREFIXES
        .iter()
        .filter(|(prefix, _)| trimmed.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, state)| *state)
}

/// The fields of a [`SlurmJob`] that survive serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlurmJobSnapshot {
    pub launch: LaunchParameters,
    pub jobid: String,
}

pub struct SlurmJob {
    launch: LaunchParameters,
    jobid: String,
    transport: Arc<dyn Transport>,
}

impl SlurmJob {
    pub fn new(launch: LaunchParameters, transport: Arc<dyn Transport>) -> Self {
        Self { launch, jobid: String::new(), transport }
    }

    pub fn snapshot(&self) -> SlurmJobSnapshot {
        SlurmJobSnapshot { launch: self.launch.clone(), jobid: self.jobid.clone() }
    }

    pub fn from_snapshot(snapshot: SlurmJobSnapshot, transport: Arc<dyn Transport>) -> Self {
        Self { launch: snapshot.launch, jobid: snapshot.jobid, transport }
    }

    fn remote_path(&self, parts: &[&str]) -> String {
        path_join(&self.launch.work_directory, parts, true)
    }

    /// The batch script, per §4.F's exact line ordering. Line endings are LF.
    fn batch_script(&self) -> String {
        let mut lines = vec![
            "#!/bin/bash -l".to_string(),
            "#SBATCH --output=logs/output.log".to_string(),
            "#SBATCH --error=logs/error.log".to_string(),
        ];

        if !self.launch.name.is_empty() {
            lines.push(format!("#SBATCH --job-name={}", self.launch.name));
        }
        if self.launch.ntasks > 0 {
            lines.push(format!("#SBATCH --ntasks={}", self.launch.ntasks));
        }
        if self.launch.nodes > 0 {
            lines.push(format!("#SBATCH --nodes={}", self.launch.nodes));
        }
        if self.launch.exclusive {
            lines.push("#SBATCH --exclusive".to_string());
        }
        if !self.launch.wall_time.is_empty() {
            lines.push(format!("#SBATCH --time={}", self.launch.wall_time));
        }
        if !self.launch.mem_per_node.is_empty() {
            lines.push(format!("#SBATCH --mem={}", self.launch.mem_per_node));
        }
        if !self.launch.mem_per_cpu.is_empty() {
            lines.push(format!("#SBATCH --mem-per-cpu={}", self.launch.mem_per_cpu));
        }
        if !self.launch.queue.is_empty() {
            lines.push(format!("#SBATCH --qos={}", self.launch.queue));
        }
        if !self.launch.partition.is_empty() {
            lines.push(format!("#SBATCH --partition={}", self.launch.partition));
        }
        if !self.launch.wckey.is_empty() {
            lines.push(format!("#SBATCH --wckey={}", self.launch.wckey));
        }
        for item in &self.launch.extra_as_list {
            lines.push(format!("#SBATCH {item}"));
        }
        if !self.launch.extra_as_string.is_empty() {
            lines.push(self.launch.extra_as_string.clone());
        }

        lines.push(String::new());
        lines.push(self.launch.command.join(" "));
        lines.push("EXIT_CODE=$?".to_string());
        lines.push("echo $EXIT_CODE > logs/exit_code.log".to_string());
        lines.push("exit $EXIT_CODE".to_string());

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }
}

#[async_trait]
impl Job for SlurmJob {
    fn jobid(&self) -> &str {
        &self.jobid
    }

    async fn submit(&mut self) -> Result<(), PluginError> {
        let logs_dir = self.remote_path(&["logs"]);
        self.transport.run(&to_argv(["mkdir", "-p", &logs_dir])).await?;

        let script_path = self.remote_path(&["batch.cmd"]);
        self.transport.create(&script_path, &self.batch_script()).await?;

        let input_files: Vec<&Path> = self.launch.input_files.iter().map(AsRef::as_ref).collect();
        if !input_files.is_empty() {
            self.transport.upload(&input_files, &self.launch.work_directory).await?;
        }

        let out = self
            .transport
            .run(&to_argv(["sbatch", "--parsable", "--chdir", &self.launch.work_directory, &script_path]))
            .await?;
        let stdout = String::from_utf8_lossy(&out);
        let jobid_field = stdout.trim().split(';').next().unwrap_or("").trim();
        let parsed: i64 = jobid_field
            .parse()
            .map_err(|_| PluginError::SubmitFailed(stdout.trim().to_string()))?;
        info!(jobid = parsed, work_directory = %self.launch.work_directory, "slurm job submitted");
        self.jobid = parsed.to_string();
        Ok(())
    }

    async fn state(&self) -> Result<JobState, PluginError> {
        if let Some(state) = created_if_empty(&self.jobid) {
            return Ok(state);
        }
        let squeue_out = self.transport.run(&to_argv(["squeue", "-h", "-o", "%T", "-j", &self.jobid])).await?;
        if let Some(state) = map_state_prefix(&String::from_utf8_lossy(&squeue_out)) {
            return Ok(state);
        }
        let sacct_out = self
            .transport
            .run(&to_argv(["sacct", "-X", "-o", "State%-10", "-n", "-j", &self.jobid]))
            .await?;
        let sacct_str = String::from_utf8_lossy(&sacct_out).trim().to_string();
        map_state_prefix(&sacct_str).ok_or_else(|| PluginError::UnknownState {
            jobid: self.jobid.clone(),
            raw: sacct_str,
        })
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
        self.transport.run(&to_argv(["scancel", &self.jobid])).await?;
        Ok(())
    }

    async fn exit_code(&self) -> Option<i32> {
        let contents = self.transport.read(&self.remote_path(&["logs", "exit_code.log"])).await.ok()?;
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
            .map(|entry| if is_absolute(entry, true) { (*entry).to_string() } else { self.remote_path(&[entry]) })
            .collect();
        let refs: Vec<&str> = resolved.iter().map(String::as_str).collect();
        self.transport.download(&refs, local_dir).await.map_err(Into::into)
    }
}

fn to_argv<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
#[path = "slurm_tests.rs"]
mod tests;
