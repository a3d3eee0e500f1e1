// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The double-fork daemonizer.
//!
//! `submit` forks twice: the middle child reports the grandchild's pid (the
//! job's sole handle) back to the caller over a pipe and exits; the
//! grandchild detaches via `setsid` and runs the user's command, writing
//! `logs/exit_code.log` when it's done.
//! Everything between the second `fork` and the point where the grandchild
//! either execs the user's command or calls `exit` is kept to
//! async-signal-safe primitives — plain `libc` calls for the fd plumbing,
//! since their signatures don't shift across versions the way a safe
//! wrapper crate's might.

use crate::workdir::{prepare_workdir, WorkdirPaths};
use crate::JobSpec;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::waitpid;
use nix::unistd::{fork, setsid, ForkResult};
use std::ffi::CString;
use std::io;
use std::os::unix::io::RawFd;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Fork off a detached daemon running `spec.command` and return the
/// grandchild's pid, read back over an internal pipe.
///
/// Safety-relevant note: this calls `fork` from what may be a
/// multi-threaded process. Between `fork` and the point where the
/// grandchild either execs a fresh process (via [`Command::spawn`]) or
/// calls `exit`, only async-signal-safe syscalls are used.
pub fn submit(spec: JobSpec) -> io::Result<i32> {
    let paths = prepare_workdir(&spec)?;
    let (read_fd, write_fd) = make_pipe()?;

    // Safety: the child branches below only call setsid/dup2/close/fork and
    // libc read/write/exit before execing or exiting, all async-signal-safe.
    match unsafe { fork() }.map_err(nix_to_io)? {
        ForkResult::Parent { child } => {
            unsafe { libc::close(write_fd) };
            let pid = read_pid_from_pipe(read_fd);
            unsafe { libc::close(read_fd) };
            let _ = waitpid(child, None);
            pid
        }
        ForkResult::Child => {
            unsafe { libc::close(read_fd) };
            run_middle_child(write_fd, spec, paths)
        }
    }
}

fn nix_to_io(e: nix::Error) -> io::Error {
    io::Error::from_raw_os_error(e as i32)
}

fn make_pipe() -> io::Result<(RawFd, RawFd)> {
    let mut fds = [0 as RawFd; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok((fds[0], fds[1]))
}

fn read_pid_from_pipe(read_fd: RawFd) -> io::Result<i32> {
    let mut buf = [0u8; 32];
    let mut total = 0usize;
    loop {
        let n = unsafe {
            libc::read(
                read_fd,
                buf[total..].as_mut_ptr().cast(),
                buf.len() - total,
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        if n == 0 {
            break;
        }
        total += n as usize;
    }
    std::str::from_utf8(&buf[..total])
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "daemonizer did not report a pid"))
}

/// Never returns: exits the process directly. Reports the grandchild's pid
/// back to the top-level parent over `write_fd` only; printing it to stdout
/// as the CLI's sole handle is the caller's job (see `pbatchd submit`), not
/// this shared routine's, since it also backs the in-process local plugin.
fn run_middle_child(write_fd: RawFd, spec: JobSpec, paths: WorkdirPaths) -> ! {
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            let pid = child.as_raw();
            let message = pid.to_string();
            unsafe { libc::write(write_fd, message.as_ptr().cast(), message.len()) };
            unsafe { libc::close(write_fd) };
            std::process::exit(0);
        }
        Ok(ForkResult::Child) => {
            unsafe { libc::close(write_fd) };
            daemonize_and_run(spec, paths);
        }
        Err(_) => std::process::exit(1),
    }
}

/// The grandchild: detaches from the controlling terminal and runs the
/// user's command, then exits with a code that is informational only (the
/// real result lives in `exit_code.log`).
fn daemonize_and_run(spec: JobSpec, paths: WorkdirPaths) -> ! {
    let _ = setsid();
    unsafe {
        let _ = signal::sigaction(
            Signal::SIGHUP,
            &SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty()),
        );
    }
    redirect_standard_streams(&paths);

    if spec.total_jobs > 1 {
        run_array(&spec, &paths);
    } else {
        run_single(&spec, &paths);
    }
    std::process::exit(0);
}

fn redirect_standard_streams(paths: &WorkdirPaths) {
    if let Some(log_fd) = open_append(&paths.manager_log) {
        unsafe {
            libc::dup2(log_fd, libc::STDOUT_FILENO);
            libc::dup2(log_fd, libc::STDERR_FILENO);
            libc::close(log_fd);
        }
    }
    if let Ok(devnull) = CString::new("/dev/null") {
        let null_fd = unsafe { libc::open(devnull.as_ptr(), libc::O_RDWR) };
        if null_fd >= 0 {
            unsafe {
                libc::dup2(null_fd, libc::STDIN_FILENO);
                libc::close(null_fd);
            }
        }
    }
}

fn open_append(path: &std::path::Path) -> Option<RawFd> {
    let cpath = CString::new(path.to_string_lossy().into_owned()).ok()?;
    let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND, 0o644) };
    (fd >= 0).then_some(fd)
}

/// Runs `spec.command`, waiting up to `wall_time_secs`; a SIGTERM delivered
/// to this (the grandchild) process is forwarded to the child before it is
/// reaped. Writes the final exit code to `exit_code.log`.
fn run_single(spec: &JobSpec, paths: &WorkdirPaths) {
    let Ok(mut child) = spawn_logged(&spec.command, &spec.work_directory, paths, false) else {
        write_exit_code(paths, -1);
        return;
    };
    let code = wait_with_wall_time(&mut child, spec.wall_time_secs);
    write_exit_code(paths, code);
}

/// Runs `spec.command [0]`, `spec.command [1]`, ... up to `total_jobs`,
/// appending output to the shared log files. Stops early on SIGTERM.
/// `max_simul_jobs` is accepted but treated as advisory (see design notes).
/// Persists the last non-zero exit code seen, or 0 if every invocation
/// succeeded.
fn run_array(spec: &JobSpec, paths: &WorkdirPaths) {
    let mut global_exit_code = 0;
    for idx in 0..spec.total_jobs {
        let mut argv = spec.command.clone();
        argv.push(idx.to_string());
        let Ok(mut child) = spawn_logged(&argv, &spec.work_directory, paths, true) else {
            global_exit_code = -1;
            break;
        };
        let code = wait_with_wall_time(&mut child, spec.wall_time_secs);
        if code != 0 {
            global_exit_code = code;
        }
        if TERMINATED.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }
    }
    write_exit_code(paths, global_exit_code);
}

fn spawn_logged(
    argv: &[String],
    work_directory: &std::path::Path,
    paths: &WorkdirPaths,
    append: bool,
) -> io::Result<std::process::Child> {
    let Some(program) = argv.first() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
    };
    let rest = argv.get(1..).unwrap_or(&[]);
    let stdout = open_log(&paths.output_log, append)?;
    let stderr = open_log(&paths.error_log, append)?;
    install_sigterm_handler();
    Command::new(program)
        .args(rest)
        .current_dir(work_directory)
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .stdin(Stdio::null())
        .spawn()
}

fn open_log(path: &std::path::Path, append: bool) -> io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
}

static TERMINATED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
static CHILD_PID: std::sync::atomic::AtomicI32 = std::sync::atomic::AtomicI32::new(0);

extern "C" fn handle_sigterm(_: i32) {
    TERMINATED.store(true, std::sync::atomic::Ordering::SeqCst);
    let pid = CHILD_PID.load(std::sync::atomic::Ordering::SeqCst);
    if pid > 0 {
        unsafe { libc::kill(pid, libc::SIGTERM) };
    }
}

fn install_sigterm_handler() {
    unsafe {
        let _ = signal::sigaction(
            Signal::SIGTERM,
            &SigAction::new(SigHandler::Handler(handle_sigterm), SaFlags::empty(), SigSet::empty()),
        );
    }
}

/// Waits for `child`, forwarding SIGTERM via [`handle_sigterm`] and
/// terminating+reaping on wall-time expiry.
fn wait_with_wall_time(child: &mut std::process::Child, wall_time_secs: Option<u64>) -> i32 {
    CHILD_PID.store(child.id() as i32, std::sync::atomic::Ordering::SeqCst);

    let Some(limit) = wall_time_secs.filter(|s| *s > 0) else {
        return reap(child);
    };

    let deadline = std::time::Instant::now() + Duration::from_secs(limit);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return exit_code_of(status),
            Ok(None) => {
                if std::time::Instant::now() >= deadline {
                    unsafe { libc::kill(child.id() as i32, libc::SIGTERM) };
                    return reap(child);
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(_) => return -1,
        }
    }
}

fn reap(child: &mut std::process::Child) -> i32 {
    match child.wait() {
        Ok(status) => exit_code_of(status),
        Err(_) => -1,
    }
}

fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.code().unwrap_or_else(|| -status.signal().unwrap_or(0))
}

fn write_exit_code(paths: &WorkdirPaths, code: i32) {
    let _ = std::fs::write(&paths.exit_code_log, code.to_string());
}

#[cfg(test)]
#[path = "fork_tests.rs"]
mod tests;
