// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process transport: runs commands and copies files on the local
//! machine, with no network hop and no shell in the middle.

use crate::{Transport, TransportError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Executes commands directly via [`tokio::process::Command`] and copies
/// files with [`tokio::fs`]. Grounded on the copy/run pair in
/// `protocols/local.py`: no shell quoting is involved since argv is passed
/// straight to `exec`, not interpolated into a command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

async fn copy_recursive(src: &Path, dst: &Path) -> Result<(), TransportError> {
    let meta = tokio::fs::metadata(src).await?;
    if meta.is_dir() {
        tokio::fs::create_dir_all(dst).await?;
        let mut entries = tokio::fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let child_dst = dst.join(entry.file_name());
            Box::pin(copy_recursive(&entry.path(), &child_dst)).await?;
        }
        Ok(())
    } else if meta.is_file() {
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(src, dst).await?;
        Ok(())
    } else {
        Err(TransportError::Copy(src.display().to_string()))
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TransportError> {
        let (program, args) = argv.split_first().ok_or_else(|| TransportError::Command {
            code: -1,
            argv: String::new(),
            stderr: "empty command".to_string(),
        })?;
        let output = Command::new(program).args(args).output().await?;
        if !output.status.success() {
            return Err(TransportError::Command {
                code: output.status.code().unwrap_or(-1),
                argv: argv.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output.stdout)
    }

    async fn upload(&self, local_entries: &[&Path], remote_dir: &str) -> Result<(), TransportError> {
        let remote_dir = PathBuf::from(remote_dir);
        tokio::fs::create_dir_all(&remote_dir).await?;
        for entry in local_entries {
            let name = entry
                .file_name()
                .ok_or_else(|| TransportError::Copy(entry.display().to_string()))?;
            copy_recursive(entry, &remote_dir.join(name)).await?;
        }
        Ok(())
    }

    async fn download(&self, remote_entries: &[&str], local_dir: &Path) -> Result<(), TransportError> {
        tokio::fs::create_dir_all(local_dir).await?;
        for entry in remote_entries {
            let src = PathBuf::from(entry);
            let name = src
                .file_name()
                .ok_or_else(|| TransportError::Copy(entry.to_string()))?;
            copy_recursive(&src, &local_dir.join(name)).await?;
        }
        Ok(())
    }

    async fn create(&self, remote_path: &str, content: &str) -> Result<(), TransportError> {
        if let Some(parent) = Path::new(remote_path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(remote_path, content).await?;
        Ok(())
    }

    async fn read(&self, remote_path: &str) -> Result<String, TransportError> {
        Ok(tokio::fs::read_to_string(remote_path).await?)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
