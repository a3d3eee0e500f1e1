// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for transport operations.

use thiserror::Error;

/// Errors raised by a [`crate::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Source path was neither a file nor a directory.
    #[error("copy error: path {0} is neither a file nor a directory")]
    Copy(String),

    /// The transport failed to open a session (persistent SSH only).
    #[error("failed to connect to {host}: {message}")]
    Connect { host: String, message: String },

    /// A remote command returned a non-zero exit code.
    ///
    /// The message deliberately contains the integer code, the full argv,
    /// and stderr text as separate, greppable substrings — callers are
    /// expected to match on this text.
    #[error("Error {code}.\n  command: {argv}.\n  stderr: {stderr}")]
    Command {
        code: i32,
        argv: String,
        stderr: String,
    },

    /// Local I/O failure not covered by the above (e.g. spawning `ssh`
    /// itself failed, not the remote command).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
