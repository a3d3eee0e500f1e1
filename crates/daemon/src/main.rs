// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pbatchd: the standalone remote daemonizer binary.
//!
//! Bit-exact CLI, since callers on the other end of a transport depend on
//! its stdout contract:
//!
//!   submit WORKDIR [--wall_time S] [--ntasks N] [--total_jobs K] [--max_simul_jobs M] CMD [ARGS...]
//!   wait PID
//!   state PID WORKDIR
//!   cancel PID

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use pbatch_daemon::{cancel, state, submit, wait_for_exit, JobSpec};
use std::path::PathBuf;
use std::time::Duration;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((subcommand, rest)) = args.split_first() else {
        usage_and_exit();
    };

    let result = match subcommand.as_str() {
        "submit" => run_submit(rest),
        "wait" => run_wait(rest),
        "state" => run_state(rest),
        "cancel" => run_cancel(rest),
        _ => usage_and_exit(),
    };

    if let Err(message) = result {
        eprintln!("pbatchd: {message}");
        std::process::exit(1);
    }
}

fn usage_and_exit() -> ! {
    eprintln!(
        "usage: pbatchd submit WORKDIR [--wall_time S] [--ntasks N] [--total_jobs K] [--max_simul_jobs M] CMD [ARGS...]\n       pbatchd wait PID\n       pbatchd state PID WORKDIR\n       pbatchd cancel PID"
    );
    std::process::exit(2);
}

fn run_submit(args: &[String]) -> Result<(), String> {
    let Some((workdir, rest)) = args.split_first() else {
        return Err("submit requires a WORKDIR".into());
    };

    let mut wall_time_secs = None;
    let mut ntasks = 0u32;
    let mut total_jobs = 1u32;
    let mut max_simul_jobs = 1u32;
    let mut idx = 0;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--wall_time" => {
                wall_time_secs = Some(parse_flag(rest, &mut idx, "--wall_time")?);
            }
            "--ntasks" => {
                ntasks = parse_flag(rest, &mut idx, "--ntasks")?;
            }
            "--total_jobs" => {
                total_jobs = parse_flag(rest, &mut idx, "--total_jobs")?;
            }
            "--max_simul_jobs" => {
                max_simul_jobs = parse_flag(rest, &mut idx, "--max_simul_jobs")?;
            }
            _ => break,
        }
    }

    let command: Vec<String> = rest[idx..].to_vec();
    if command.is_empty() {
        return Err("submit requires a command".into());
    }

    let spec = JobSpec {
        command,
        work_directory: PathBuf::from(workdir),
        wall_time_secs,
        ntasks,
        total_jobs,
        max_simul_jobs,
    };
    let pid = submit(spec).map_err(|e| e.to_string())?;
    println!("{pid}");
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], idx: &mut usize, name: &str) -> Result<T, String> {
    let value = args
        .get(*idx + 1)
        .ok_or_else(|| format!("{name} requires a value"))?;
    let parsed = value.parse().map_err(|_| format!("{name}: invalid value {value:?}"))?;
    *idx += 2;
    Ok(parsed)
}

fn run_wait(args: &[String]) -> Result<(), String> {
    let pid = parse_pid(args)?;
    wait_for_exit(pid, Duration::from_millis(200));
    Ok(())
}

fn run_state(args: &[String]) -> Result<(), String> {
    let Some((pid_str, rest)) = args.split_first() else {
        return Err("state requires PID WORKDIR".into());
    };
    let pid: i32 = pid_str.parse().map_err(|_| format!("invalid pid {pid_str:?}"))?;
    let Some(workdir) = rest.first() else {
        return Err("state requires PID WORKDIR".into());
    };
    println!("{}", state(pid, std::path::Path::new(workdir)).as_str());
    Ok(())
}

fn run_cancel(args: &[String]) -> Result<(), String> {
    let pid = parse_pid(args)?;
    cancel(pid).map_err(|e| e.to_string())
}

fn parse_pid(args: &[String]) -> Result<i32, String> {
    args.first()
        .ok_or_else(|| "expected a PID".to_string())
        .and_then(|s| s.parse().map_err(|_| format!("invalid pid {s:?}")))
}
