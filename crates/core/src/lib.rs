// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pbatch-core: shared data model, state machine and portable utilities for
//! the pbatch job execution library.
//!
//! This crate has no knowledge of transports or plugins. It defines the
//! vocabulary (`LaunchParameters`, `ConnectionParameters`, `JobState`) and
//! the small set of pure functions (path joining, wall-time parsing, shell
//! escaping) that every plugin and transport builds on.

pub mod error;
pub mod params;
pub mod path;
pub mod shell_escape;
pub mod state;
pub mod walltime;

pub use error::TimeError;
pub use params::{ConnectionParameters, LaunchParameters};
pub use path::{is_absolute, path_join};
pub use shell_escape::escape_str;
pub use state::{parse_exit_code, state_from_exit_code_log, JobState};
pub use walltime::slurm_time_to_seconds;
