// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport backed by a single long-lived `ssh2::Session`.
//!
//! One TCP connection and one authenticated session are reused across
//! every call. The session is established lazily on first use and torn
//! down whenever this transport is serialized (so a job record carrying
//! it can cross a process boundary); deserializing it back just restores
//! the connection parameters, and the next call reconnects.

use crate::{Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use pbatch_core::ConnectionParameters;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssh2::Session;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

struct Client {
    session: Session,
}

pub struct SshPersistentTransport {
    connection: ConnectionParameters,
    client: Arc<Mutex<Option<Client>>>,
}

impl Clone for SshPersistentTransport {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            client: Arc::clone(&self.client),
        }
    }
}

impl std::fmt::Debug for SshPersistentTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshPersistentTransport")
            .field("host", &self.connection.host)
            .field("connected", &self.client.lock().is_some())
            .finish()
    }
}

impl SshPersistentTransport {
    pub fn new(connection: ConnectionParameters) -> Self {
        Self {
            connection,
            client: Arc::new(Mutex::new(None)),
        }
    }

    /// Drop the live session, forcing the next call to reconnect.
    pub fn disconnect(&self) {
        self.client.lock().take();
    }

    fn connect_blocking(connection: &ConnectionParameters) -> Result<Client, TransportError> {
        let addr = if connection.host.contains(':') {
            connection.host.clone()
        } else {
            format!("{}:22", connection.host)
        };
        let tcp = TcpStream::connect(&addr).map_err(|e| TransportError::Connect {
            host: connection.host.clone(),
            message: e.to_string(),
        })?;

        let mut session = Session::new().map_err(|e| TransportError::Connect {
            host: connection.host.clone(),
            message: e.to_string(),
        })?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| TransportError::Connect {
            host: connection.host.clone(),
            message: e.to_string(),
        })?;

        let user = connection.user.clone().unwrap_or_else(whoami_fallback);
        if connection.gss_auth {
            session
                .userauth_password(&user, "")
                .or_else(|_| session.userauth_agent(&user))
                .map_err(|e| TransportError::Connect {
                    host: connection.host.clone(),
                    message: e.to_string(),
                })?;
        } else if let Some(password) = &connection.password {
            session
                .userauth_password(&user, password)
                .map_err(|e| TransportError::Connect {
                    host: connection.host.clone(),
                    message: e.to_string(),
                })?;
        } else {
            session.userauth_agent(&user).map_err(|e| TransportError::Connect {
                host: connection.host.clone(),
                message: e.to_string(),
            })?;
        }

        debug!(host = %connection.host, "ssh session established");
        Ok(Client { session })
    }

    /// Run `f` against a connected session, reconnecting first if the
    /// session was never opened or was dropped (e.g. after [`Self::disconnect`]
    /// or deserialization).
    fn with_session<T: Send + 'static>(
        &self,
        f: impl FnOnce(&Session) -> Result<T, TransportError> + Send + 'static,
    ) -> Result<T, TransportError> {
        let client_slot = Arc::clone(&self.client);
        let connection = self.connection.clone();
        let mut guard = client_slot.lock();
        if guard.is_none() {
            *guard = Some(Self::connect_blocking(&connection)?);
        }
        let Some(client) = guard.as_ref() else {
            return Err(TransportError::Io(std::io::Error::other("session slot was unexpectedly empty")));
        };
        f(&client.session)
    }
}

fn whoami_fallback() -> String {
    std::env::var("USER").unwrap_or_else(|_| "root".to_string())
}

fn exec(session: &Session, argv: &[String]) -> Result<Vec<u8>, TransportError> {
    let command = match argv.split_first() {
        Some((head, rest)) => {
            let mut parts = vec![head.clone()];
            parts.extend(rest.iter().map(|a| pbatch_core::escape_str(a)));
            parts.join(" ")
        }
        None => String::new(),
    };
    let mut channel = session.channel_session().map_err(io_connect_error)?;
    channel.exec(&command).map_err(io_connect_error)?;

    let mut stdout = Vec::new();
    channel.read_to_end(&mut stdout).map_err(|e| TransportError::Io(e))?;
    let mut stderr = Vec::new();
    channel.stderr().read_to_end(&mut stderr).map_err(|e| TransportError::Io(e))?;
    channel.wait_close().map_err(io_connect_error)?;

    let code = channel.exit_status().map_err(io_connect_error)?;
    if code != 0 {
        return Err(TransportError::Command {
            code,
            argv: argv.join(" "),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        });
    }
    Ok(stdout)
}

fn io_connect_error(e: ssh2::Error) -> TransportError {
    TransportError::Io(std::io::Error::other(e))
}

#[async_trait]
impl Transport for SshPersistentTransport {
    async fn run(&self, argv: &[String]) -> Result<Vec<u8>, TransportError> {
        let this = self.clone();
        let argv = argv.to_vec();
        tokio::task::spawn_blocking(move || this.with_session(move |s| exec(s, &argv)))
            .await
            .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }

    async fn upload(&self, local_entries: &[&Path], remote_dir: &str) -> Result<(), TransportError> {
        let this = self.clone();
        let remote_dir = remote_dir.to_string();
        let entries: Vec<std::path::PathBuf> = local_entries.iter().map(|p| p.to_path_buf()).collect();
        tokio::task::spawn_blocking(move || {
            this.with_session(move |session| {
                for local in &entries {
                    upload_one(session, local, &remote_dir)?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }

    async fn download(&self, remote_entries: &[&str], local_dir: &Path) -> Result<(), TransportError> {
        tokio::fs::create_dir_all(local_dir).await?;
        let this = self.clone();
        let local_dir = local_dir.to_path_buf();
        let entries: Vec<String> = remote_entries.iter().map(|s| s.to_string()).collect();
        tokio::task::spawn_blocking(move || {
            this.with_session(move |session| {
                for remote in &entries {
                    download_one(session, remote, &local_dir)?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }

    async fn create(&self, remote_path: &str, content: &str) -> Result<(), TransportError> {
        let this = self.clone();
        let remote_path = remote_path.to_string();
        let content = content.to_string();
        tokio::task::spawn_blocking(move || {
            this.with_session(move |session| {
                let mut remote = session
                    .scp_send(Path::new(&remote_path), 0o644, content.len() as u64, None)
                    .map_err(io_connect_error)?;
                remote.write_all(content.as_bytes()).map_err(|e| TransportError::Io(e))?;
                remote.send_eof().map_err(io_connect_error)?;
                remote.wait_eof().map_err(io_connect_error)?;
                remote.close().map_err(io_connect_error)?;
                remote.wait_close().map_err(io_connect_error)?;
                Ok(())
            })
        })
        .await
        .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }

    async fn read(&self, remote_path: &str) -> Result<String, TransportError> {
        let this = self.clone();
        let remote_path = remote_path.to_string();
        tokio::task::spawn_blocking(move || {
            this.with_session(move |session| {
                let (mut remote, _stat) = session.scp_recv(Path::new(&remote_path)).map_err(io_connect_error)?;
                let mut buf = Vec::new();
                remote.read_to_end(&mut buf).map_err(|e| TransportError::Io(e))?;
                remote.send_eof().map_err(io_connect_error)?;
                remote.wait_eof().map_err(io_connect_error)?;
                remote.close().map_err(io_connect_error)?;
                remote.wait_close().map_err(io_connect_error)?;
                Ok(String::from_utf8_lossy(&buf).into_owned())
            })
        })
        .await
        .map_err(|e| TransportError::Io(std::io::Error::other(e)))?
    }
}

fn upload_one(session: &Session, local: &Path, remote_dir: &str) -> Result<(), TransportError> {
    let name = local
        .file_name()
        .ok_or_else(|| TransportError::Copy(local.display().to_string()))?;
    if local.is_dir() {
        let remote_sub = format!("{remote_dir}/{}", name.to_string_lossy());
        exec(session, &["mkdir".to_string(), "-p".to_string(), remote_sub.clone()])?;
        for entry in std::fs::read_dir(local).map_err(TransportError::Io)? {
            let entry = entry.map_err(TransportError::Io)?;
            upload_one(session, &entry.path(), &remote_sub)?;
        }
        Ok(())
    } else {
        let data = std::fs::read(local).map_err(TransportError::Io)?;
        let remote_path = format!("{remote_dir}/{}", name.to_string_lossy());
        let mut remote = session
            .scp_send(Path::new(&remote_path), 0o644, data.len() as u64, None)
            .map_err(io_connect_error)?;
        remote.write_all(&data).map_err(TransportError::Io)?;
        remote.send_eof().map_err(io_connect_error)?;
        remote.wait_eof().map_err(io_connect_error)?;
        remote.close().map_err(io_connect_error)?;
        remote.wait_close().map_err(io_connect_error)?;
        Ok(())
    }
}

fn download_one(session: &Session, remote: &str, local_dir: &Path) -> Result<(), TransportError> {
    let name = Path::new(remote)
        .file_name()
        .ok_or_else(|| TransportError::Copy(remote.to_string()))?;
    let (mut channel, stat) = session.scp_recv(Path::new(remote)).map_err(io_connect_error)?;
    let mut buf = Vec::new();
    channel.read_to_end(&mut buf).map_err(TransportError::Io)?;
    channel.send_eof().map_err(io_connect_error)?;
    channel.wait_eof().map_err(io_connect_error)?;
    channel.close().map_err(io_connect_error)?;
    channel.wait_close().map_err(io_connect_error)?;
    let _ = stat;
    std::fs::write(local_dir.join(name), buf).map_err(TransportError::Io)?;
    Ok(())
}

/// Serializing drops the live connection: only the host/user/auth fields
/// survive the round trip.
impl Serialize for SshPersistentTransport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.connection.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SshPersistentTransport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let connection = ConnectionParameters::deserialize(deserializer)?;
        Ok(Self::new(connection))
    }
}

#[cfg(test)]
#[path = "ssh_persistent_tests.rs"]
mod tests;
