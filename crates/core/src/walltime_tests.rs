// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    blank = { "  ", "" },
    minutes = { "10", "600" },
    minutes_seconds = { "10:30", "630" },
    hours_minutes_seconds = { "2:10:5", "7805" },
    days_hours_minutes_seconds = { "2-2:10:30", "180630" },
    days_hours = { "2-2", "180000" },
    days_hours_minutes = { "2-2:10", "180600" },
)]
fn parses_valid_formats(input: &str, expected: &str) {
    assert_eq!(slurm_time_to_seconds(input).unwrap(), expected);
}

#[yare::parameterized(
    too_many_day_parts = { "2-0-4" },
    non_numeric = { "xvi" },
    too_many_colon_parts = { "1:2:3:4" },
)]
fn rejects_malformed_input(input: &str) {
    assert!(matches!(
        slurm_time_to_seconds(input),
        Err(TimeError::InvalidTime(_))
    ));
}

#[test]
fn round_trips_through_itself() {
    // slurm_time_to_seconds is already expressed in seconds, so re-parsing
    // its own output (a bare "minutes" string) is idempotent.
    for input in ["0", "600", "7805", "180630"] {
        let once = slurm_time_to_seconds(input).unwrap();
        let twice = slurm_time_to_seconds(&once).unwrap();
        assert_eq!(once, twice);
    }
}
