// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job launch parameters and remote connection parameters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters of a job to be launched.
///
/// Mirrors the fields every plugin needs to build a command line, a batch
/// script, or a daemonizer invocation. Fields not meaningful to a given
/// plugin (e.g. `queue` for the local plugin) are simply ignored by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchParameters {
    /// Full command to run, as `argv`.
    pub command: Vec<String>,
    /// Remote (or local) work directory.
    pub work_directory: String,
    pub name: String,
    /// Number of required nodes, 0 for undefined.
    pub nodes: u32,
    /// Number of required tasks, 0 for undefined.
    pub ntasks: u32,
    pub exclusive: bool,
    /// Slurm-format wall-time string; see [`crate::slurm_time_to_seconds`].
    pub wall_time: String,
    pub mem_per_node: String,
    pub mem_per_cpu: String,
    pub queue: String,
    pub partition: String,
    pub wckey: String,
    pub extra_as_string: String,
    pub extra_as_list: Vec<String>,
    /// Local paths copied into `work_directory` before submission.
    pub input_files: Vec<PathBuf>,
    /// Remote OS family: `true` for POSIX, `false` for Windows.
    pub is_posix: bool,
    /// Whether to materialize `batch_nodefile.txt` when `ntasks > 0`.
    pub create_nodefile: bool,
    /// Size of the job array. `1` means a single, non-arrayed invocation.
    pub total_jobs: u32,
    /// Advisory concurrency cap for job arrays (see design note in §9).
    pub max_simul_jobs: u32,
}

impl LaunchParameters {
    /// Start building a `LaunchParameters` for the given command and work
    /// directory, with every optional field at its default.
    pub fn new(command: impl IntoIterator<Item = impl Into<String>>, work_directory: impl Into<String>) -> Self {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            work_directory: work_directory.into(),
            name: String::new(),
            nodes: 0,
            ntasks: 0,
            exclusive: false,
            wall_time: String::new(),
            mem_per_node: String::new(),
            mem_per_cpu: String::new(),
            queue: String::new(),
            partition: String::new(),
            wckey: String::new(),
            extra_as_string: String::new(),
            extra_as_list: Vec::new(),
            input_files: Vec::new(),
            is_posix: true,
            create_nodefile: false,
            total_jobs: 1,
            max_simul_jobs: 1,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_wall_time(mut self, wall_time: impl Into<String>) -> Self {
        self.wall_time = wall_time.into();
        self
    }

    pub fn with_ntasks(mut self, ntasks: u32) -> Self {
        self.ntasks = ntasks;
        self
    }

    pub fn with_nodefile(mut self, create: bool) -> Self {
        self.create_nodefile = create;
        self
    }

    pub fn with_array(mut self, total_jobs: u32, max_simul_jobs: u32) -> Self {
        self.total_jobs = total_jobs.max(1);
        self.max_simul_jobs = max_simul_jobs.max(1);
        self
    }

    pub fn with_input_files(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.input_files = files.into_iter().collect();
        self
    }
}

/// Parameters needed to connect to a remote server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionParameters {
    pub host: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Use the GSS API for authentication (required for Kerberos).
    pub gss_auth: bool,
}

impl ConnectionParameters {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            password: None,
            gss_auth: false,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_gss_auth(mut self, gss_auth: bool) -> Self {
        self.gss_auth = gss_auth;
        self
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
