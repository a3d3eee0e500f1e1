// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for job submission, tracking, and plugin resolution.

use pbatch_core::TimeError;
use pbatch_transport::TransportError;
use thiserror::Error;

/// Errors raised anywhere along a [`crate::Job`]'s lifecycle.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("invalid wall time: {0}")]
    InvalidTime(#[from] TimeError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("submit failed: daemonizer did not report a usable job id: {0:?}")]
    SubmitFailed(String),

    #[error("could not derive job state for {jobid} from batch manager output: {raw:?}")]
    UnknownState { jobid: String, raw: String },

    #[error("no such plugin: {0:?}")]
    PluginNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
