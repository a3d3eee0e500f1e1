// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for utilities owned by this crate.

use thiserror::Error;

/// Failure to parse a Slurm-format wall-time string.
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("invalid time format: {0}")]
    InvalidTime(String),
}
