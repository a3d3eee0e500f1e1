// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The minimal concrete plugin registry: a static match over the three
//! built-in plugin names. Not an extensible loading mechanism — adding a
//! fourth plugin means adding a match arm here, by design.

use crate::error::PluginError;
use crate::job::Job;
use crate::local::LocalJob;
use crate::nobatch::NobatchJob;
use crate::slurm::SlurmJob;
use pbatch_core::LaunchParameters;
use pbatch_transport::Transport;
use std::path::PathBuf;
use std::sync::Arc;

/// Construct a `Job` for one of the built-in plugins.
///
/// `transport` is required by `nobatch` and `slurm`, ignored by `local`.
/// `daemonizer_binary` (the local path to the compiled `pbatchd`) is
/// required by `nobatch` only, which ships it alongside `input_files`.
pub fn create_job(
    plugin_name: &str,
    launch: LaunchParameters,
    transport: Option<Arc<dyn Transport>>,
    daemonizer_binary: Option<PathBuf>,
) -> Result<Box<dyn Job>, PluginError> {
    match plugin_name {
        "local" => Ok(Box::new(LocalJob::new(launch))),
        "nobatch" => {
            let transport = require_transport(transport, "nobatch")?;
            let binary = daemonizer_binary
                .ok_or_else(|| PluginError::SubmitFailed("nobatch plugin requires a daemonizer binary path".into()))?;
            Ok(Box::new(NobatchJob::new(launch, transport, binary)))
        }
        "slurm" => {
            let transport = require_transport(transport, "slurm")?;
            Ok(Box::new(SlurmJob::new(launch, transport)))
        }
        other => Err(PluginError::PluginNotFound(other.to_string())),
    }
}

fn require_transport(transport: Option<Arc<dyn Transport>>, plugin: &str) -> Result<Arc<dyn Transport>, PluginError> {
    transport.ok_or_else(|| PluginError::SubmitFailed(format!("{plugin} plugin requires a transport")))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
