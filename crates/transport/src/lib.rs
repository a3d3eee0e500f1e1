// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pbatch-transport: the capability bundle plugins use to move commands and
//! files to and from an execution host.
//!
//! Three implementations share one [`Transport`] trait: [`local::LocalTransport`]
//! (in-process), [`ssh_subprocess::SshSubprocessTransport`] (spawns `ssh`/`scp`
//! per call) and [`ssh_persistent::SshPersistentTransport`] (one long-lived
//! SSH client). Plugins never match on which variant they hold — they only
//! see the trait.

pub mod error;
pub mod local;
pub mod ssh_persistent;
pub mod ssh_subprocess;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::TransportError;
pub use local::LocalTransport;
pub use ssh_persistent::SshPersistentTransport;
pub use ssh_subprocess::SshSubprocessTransport;

use async_trait::async_trait;
use std::path::Path;

/// Uniform `run/upload/download/create/read` contract over an execution
/// host. Implementations serialize calls internally only to the extent
/// needed to protect their own state (e.g. a single persistent SSH client);
/// the trait itself makes no interleaving guarantee across concurrent
/// callers sharing one `Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run `argv` on the target host and return its captured stdout.
    ///
    /// A non-zero exit produces [`TransportError::Command`], whose message
    /// contains the integer code, the joined argv, and stderr text.
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TransportError>;

    /// Recursively copy each local path in `local_entries` into `remote_dir`.
    async fn upload(&self, local_entries: &[&Path], remote_dir: &str) -> Result<(), TransportError>;

    /// Recursively copy each remote path in `remote_entries` into `local_dir`.
    async fn download(&self, remote_entries: &[&str], local_dir: &Path) -> Result<(), TransportError>;

    /// Write `content` as the full contents of `remote_path`.
    async fn create(&self, remote_path: &str, content: &str) -> Result<(), TransportError>;

    /// Read the full contents of `remote_path` as a UTF-8 string.
    async fn read(&self, remote_path: &str) -> Result<String, TransportError>;
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
