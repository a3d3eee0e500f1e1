// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`Transport`] for exercising plugins without touching a
//! real shell, network, or filesystem. Scripted per call, in the style of
//! the teacher's `FakeSessionAdapter`.

use crate::{Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// What a scripted [`FakeTransport::run`] call should produce.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Ok(Vec<u8>),
    Err { code: i32, stderr: String },
}

/// A `Transport` whose `run` outcomes are scripted in advance and whose
/// `create`/`read` calls hit an in-memory file map instead of a real
/// filesystem.
#[derive(Default)]
pub struct FakeTransport {
    queued_runs: Mutex<VecDeque<RunOutcome>>,
    recorded_argv: Mutex<Vec<Vec<String>>>,
    files: Mutex<HashMap<String, String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next `run` call, FIFO.
    pub fn push_run(&self, outcome: RunOutcome) {
        self.queued_runs.lock().push_back(outcome);
    }

    /// Pre-seed a remote file so a plugin's `read` can observe it.
    pub fn seed_file(&self, remote_path: impl Into<String>, content: impl Into<String>) {
        self.files.lock().insert(remote_path.into(), content.into());
    }

    /// Every argv passed to `run` so far, in call order.
    pub fn recorded_argv(&self) -> Vec<Vec<String>> {
        self.recorded_argv.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TransportError> {
        self.recorded_argv.lock().push(argv.to_vec());
        let outcome = self
            .queued_runs
            .lock()
            .pop_front()
            .unwrap_or(RunOutcome::Ok(Vec::new()));
        match outcome {
            RunOutcome::Ok(bytes) => Ok(bytes),
            RunOutcome::Err { code, stderr } => Err(TransportError::Command {
                code,
                argv: argv.join(" "),
                stderr,
            }),
        }
    }

    async fn upload(&self, _local_entries: &[&Path], _remote_dir: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn download(&self, _remote_entries: &[&str], _local_dir: &Path) -> Result<(), TransportError> {
        Ok(())
    }

    async fn create(&self, remote_path: &str, content: &str) -> Result<(), TransportError> {
        self.files.lock().insert(remote_path.to_string(), content.to_string());
        Ok(())
    }

    async fn read(&self, remote_path: &str) -> Result<String, TransportError> {
        self.files
            .lock()
            .get(remote_path)
            .cloned()
            .ok_or_else(|| TransportError::Copy(remote_path.to_string()))
    }
}
