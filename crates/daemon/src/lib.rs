// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pbatch-daemon: the process-control primitives shared by the standalone
//! remote daemonizer binary (`pbatchd`) and the in-process local plugin.
//!
//! This crate is deliberately small. The remote daemonizer has to run on
//! whatever ancient distribution a cluster's login node happens to carry,
//! so it links against process/signal plumbing only — no async runtime,
//! no serialization, no logging framework.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod fork;
mod probe;
mod workdir;

pub use fork::submit;
pub use probe::{cancel, read_exit_code, state, wait_for_exit};
pub use workdir::{prepare_workdir, WorkdirPaths};

use std::path::PathBuf;

/// Everything a submission needs to know, independent of which plugin is
/// driving it.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub command: Vec<String>,
    pub work_directory: PathBuf,
    /// Already resolved to seconds by the caller (see `pbatch_core::slurm_time_to_seconds`).
    pub wall_time_secs: Option<u64>,
    pub ntasks: u32,
    pub total_jobs: u32,
    pub max_simul_jobs: u32,
}
