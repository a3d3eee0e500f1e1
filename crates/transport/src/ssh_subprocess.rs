// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport that shells out to the system `ssh`/`scp` binaries per call.
//!
//! No connection is kept open between calls: every [`Transport::run`] pays
//! for a fresh handshake. This trades latency for zero persistent state,
//! which is what the bootstrap daemonizer wants — it only ever issues a
//! handful of calls over its lifetime, grounded on `protocols/ssh.py`'s
//! `os.system`-based implementation.

use crate::{Transport, TransportError};
use async_trait::async_trait;
use pbatch_core::{escape_str, ConnectionParameters};
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct SshSubprocessTransport {
    connection: ConnectionParameters,
    ssh_binary: String,
    scp_binary: String,
}

impl SshSubprocessTransport {
    pub fn new(connection: ConnectionParameters) -> Self {
        Self {
            connection,
            ssh_binary: "ssh".to_string(),
            scp_binary: "scp".to_string(),
        }
    }

    /// Override the `ssh`/`scp` binaries, e.g. to point at test stubs on `$PATH`.
    pub fn with_binaries(mut self, ssh_binary: impl Into<String>, scp_binary: impl Into<String>) -> Self {
        self.ssh_binary = ssh_binary.into();
        self.scp_binary = scp_binary.into();
        self
    }

    fn destination(&self) -> String {
        match &self.connection.user {
            Some(user) => format!("{user}@{}", self.connection.host),
            None => self.connection.host.clone(),
        }
    }

    fn ssh_auth_flags(&self) -> Vec<String> {
        if self.connection.gss_auth {
            vec!["-o".to_string(), "GSSAPIAuthentication=yes".to_string()]
        } else {
            Vec::new()
        }
    }

    async fn run_ssh(&self, remote_command: &str) -> Result<Vec<u8>, TransportError> {
        let mut trailing_args = self.ssh_auth_flags();
        trailing_args.push(self.destination());
        trailing_args.push(remote_command.to_string());

        let output = Command::new(&self.ssh_binary).args(&trailing_args).output().await?;
        if !output.status.success() {
            return Err(TransportError::Command {
                code: output.status.code().unwrap_or(-1),
                argv: full_argv(&self.ssh_binary, &trailing_args),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output.stdout)
    }

    async fn run_scp(&self, args: &[String]) -> Result<(), TransportError> {
        let mut trailing_args = vec!["-r".to_string()];
        trailing_args.extend(args.iter().cloned());

        let output = Command::new(&self.scp_binary).args(&trailing_args).output().await?;
        if !output.status.success() {
            return Err(TransportError::Command {
                code: output.status.code().unwrap_or(-1),
                argv: full_argv(&self.scp_binary, &trailing_args),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

fn full_argv(program: &str, trailing_args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(trailing_args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Joins `argv` into one remote shell command, escaping every argument
/// except the command name itself (argv[0]), which is passed verbatim.
fn escape_argv(argv: &[String]) -> String {
    match argv.split_first() {
        Some((head, rest)) => {
            let mut parts = vec![head.clone()];
            parts.extend(rest.iter().map(|a| escape_str(a)));
            parts.join(" ")
        }
        None => String::new(),
    }
}

#[async_trait]
impl Transport for SshSubprocessTransport {
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TransportError> {
        let remote_command = escape_argv(argv);
        self.run_ssh(&remote_command).await
    }

    async fn upload(&self, local_entries: &[&Path], remote_dir: &str) -> Result<(), TransportError> {
        self.run_ssh(&format!("mkdir -p {}", escape_str(remote_dir))).await?;
        let destination = self.destination();
        let mut args: Vec<String> = local_entries.iter().map(|p| p.display().to_string()).collect();
        args.push(format!("{destination}:{remote_dir}"));
        self.run_scp(&args).await
    }

    async fn download(&self, remote_entries: &[&str], local_dir: &Path) -> Result<(), TransportError> {
        tokio::fs::create_dir_all(local_dir).await?;
        let destination = self.destination();
        let mut args: Vec<String> = remote_entries
            .iter()
            .map(|entry| format!("{destination}:{entry}"))
            .collect();
        args.push(local_dir.display().to_string());
        self.run_scp(&args).await
    }

    async fn create(&self, remote_path: &str, content: &str) -> Result<(), TransportError> {
        let remote_command = format!("cat > {}", escape_str(remote_path));
        let mut trailing_args = self.ssh_auth_flags();
        trailing_args.push(self.destination());
        trailing_args.push(remote_command);

        let mut child = Command::new(&self.ssh_binary)
            .args(&trailing_args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()?;

        use tokio::io::AsyncWriteExt;
        let Some(mut stdin) = child.stdin.take() else {
            return Err(TransportError::Io(std::io::Error::other("child stdin was not piped")));
        };
        stdin.write_all(content.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(TransportError::Command {
                code: output.status.code().unwrap_or(-1),
                argv: full_argv(&self.ssh_binary, &trailing_args),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    async fn read(&self, remote_path: &str) -> Result<String, TransportError> {
        let bytes = self.run_ssh(&format!("cat {}", escape_str(remote_path))).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
#[path = "ssh_subprocess_tests.rs"]
mod tests;
