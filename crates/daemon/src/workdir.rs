// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout under a job's work directory.

use crate::JobSpec;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// Paths of the artifacts a submission writes under `work_directory/logs`.
#[derive(Debug, Clone)]
pub struct WorkdirPaths {
    pub logs: PathBuf,
    pub output_log: PathBuf,
    pub error_log: PathBuf,
    pub manager_log: PathBuf,
    pub exit_code_log: PathBuf,
}

impl WorkdirPaths {
    pub fn for_workdir(work_directory: &Path) -> Self {
        let logs = work_directory.join("logs");
        Self {
            output_log: logs.join("output.log"),
            error_log: logs.join("error.log"),
            manager_log: logs.join("manager.log"),
            exit_code_log: logs.join("exit_code.log"),
            logs,
        }
    }
}

fn touch(path: &Path) -> io::Result<()> {
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

/// Ensure `logs/` exists with its three always-present files, and write
/// `batch_nodefile.txt` when the job asked for one.
pub fn prepare_workdir(spec: &JobSpec) -> io::Result<WorkdirPaths> {
    let paths = WorkdirPaths::for_workdir(&spec.work_directory);
    std::fs::create_dir_all(&paths.logs)?;
    touch(&paths.output_log)?;
    touch(&paths.error_log)?;
    touch(&paths.manager_log)?;

    if spec.ntasks > 0 {
        let hostname = hostname()?;
        let mut nodelist = String::with_capacity((hostname.len() + 1) * spec.ntasks as usize);
        for _ in 0..spec.ntasks {
            nodelist.push_str(&hostname);
            nodelist.push('\n');
        }
        std::fs::write(spec.work_directory.join("batch_nodefile.txt"), nodelist)?;
    }

    Ok(paths)
}

fn hostname() -> io::Result<String> {
    if let Ok(name) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
        return Ok(name.trim().to_string());
    }
    std::env::var("HOSTNAME").or_else(|_| std::env::var("HOST")).map_err(|_| {
        io::Error::new(io::ErrorKind::NotFound, "could not determine local hostname")
    })
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
