// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn process_exists_is_true_for_our_own_pid() {
    assert!(process_exists(std::process::id() as i32));
}

#[test]
fn process_exists_is_false_for_an_unlikely_pid() {
    assert!(!process_exists(i32::MAX - 1));
}

#[test]
fn read_exit_code_is_none_when_log_absent() {
    let dir = tempdir().unwrap();
    assert_eq!(read_exit_code(dir.path()), None);
}

#[test]
fn read_exit_code_parses_written_value() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("logs")).unwrap();
    std::fs::write(dir.path().join("logs").join("exit_code.log"), "7").unwrap();
    assert_eq!(read_exit_code(dir.path()), Some(7));
}

#[test]
fn read_exit_code_accepts_negative_signal_derived_codes() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("logs")).unwrap();
    std::fs::write(dir.path().join("logs").join("exit_code.log"), "-15").unwrap();
    assert_eq!(read_exit_code(dir.path()), Some(-15));
}

#[test]
fn state_is_finished_when_exit_code_is_zero_and_process_gone() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("logs")).unwrap();
    std::fs::write(dir.path().join("logs").join("exit_code.log"), "0").unwrap();
    assert_eq!(state(i32::MAX - 1, dir.path()), JobState::Finished);
}

#[test]
fn state_is_failed_when_exit_code_log_is_absent() {
    let dir = tempdir().unwrap();
    assert_eq!(state(i32::MAX - 1, dir.path()), JobState::Failed);
}

#[test]
fn state_is_failed_on_nonzero_exit_code() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("logs")).unwrap();
    std::fs::write(dir.path().join("logs").join("exit_code.log"), "1").unwrap();
    assert_eq!(state(i32::MAX - 1, dir.path()), JobState::Failed);
}

#[test]
fn cancel_on_an_already_gone_pid_is_not_an_error() {
    cancel(i32::MAX - 1).unwrap();
}
