//! Shared helpers for the end-to-end behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use pbatch_core::LaunchParameters;
use pbatch_plugins::LocalJob;
use std::path::Path;

pub const POLL_INTERVAL_MS: u64 = 20;
pub const POLL_MAX_MS: u64 = 10_000;

/// A `local`-plugin job rooted at `dir`, running `command`.
pub fn local_job(dir: &Path, command: &[&str]) -> LocalJob {
    LocalJob::new(LaunchParameters::new(command.iter().copied(), dir.to_str().unwrap()))
}

/// Poll `condition` until it's true or `POLL_MAX_MS` elapses.
pub async fn wait_for<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < std::time::Duration::from_millis(POLL_MAX_MS) {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
    false
}
