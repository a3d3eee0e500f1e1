// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slurm wall-time string parsing.
//!
//! See <https://slurm.schedmd.com/sbatch.html#OPT_time>. Acceptable formats:
//! `"minutes"`, `"minutes:seconds"`, `"hours:minutes:seconds"`,
//! `"days-hours"`, `"days-hours:minutes"` and `"days-hours:minutes:seconds"`.

use crate::error::TimeError;

/// Convert a Slurm-format wall-time string to a decimal seconds string.
///
/// Empty or whitespace-only input returns an empty string (no time limit).
/// Any malformed component fails with [`TimeError::InvalidTime`].
pub fn slurm_time_to_seconds(val: &str) -> Result<String, TimeError> {
    let val = val.trim();
    if val.is_empty() {
        return Ok(String::new());
    }
    let invalid = || TimeError::InvalidTime(val.to_string());

    let day_split: Vec<&str> = val.split('-').collect();
    let (days, rem): (i64, &str) = match day_split.len() {
        1 => (0, day_split[0]),
        2 => (
            day_split[0].parse().map_err(|_| invalid())?,
            day_split[1],
        ),
        _ => return Err(invalid()),
    };

    let hour_split: Vec<&str> = rem.split(':').collect();
    let (hours, minutes, seconds): (i64, i64, i64) = match hour_split.len() {
        3 => (
            hour_split[0].parse().map_err(|_| invalid())?,
            hour_split[1].parse().map_err(|_| invalid())?,
            hour_split[2].parse().map_err(|_| invalid())?,
        ),
        2 => {
            if days > 0 {
                // days-hours:minutes
                (
                    hour_split[0].parse().map_err(|_| invalid())?,
                    hour_split[1].parse().map_err(|_| invalid())?,
                    0,
                )
            } else {
                // minutes:seconds
                (
                    0,
                    hour_split[0].parse().map_err(|_| invalid())?,
                    hour_split[1].parse().map_err(|_| invalid())?,
                )
            }
        }
        1 => {
            if days > 0 {
                // days-hours
                (hour_split[0].parse().map_err(|_| invalid())?, 0, 0)
            } else {
                // minutes
                (0, hour_split[0].parse().map_err(|_| invalid())?, 0)
            }
        }
        _ => return Err(invalid()),
    };

    let total = seconds + 60 * minutes + 3600 * hours + 86_400 * days;
    Ok(total.to_string())
}

#[cfg(test)]
#[path = "walltime_tests.rs"]
mod tests;
