// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pbatch_core::ConnectionParameters;
use std::net::TcpListener;

#[tokio::test]
async fn connect_failure_surfaces_as_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept the TCP connection but never speak the SSH protocol over it,
    // so the handshake times out/fails instead of a bare connection refusal.
    let _keep_alive = std::thread::spawn(move || {
        let _ = listener.accept();
        std::thread::sleep(std::time::Duration::from_millis(200));
    });

    let transport = SshPersistentTransport::new(ConnectionParameters::new(addr.to_string()));
    let err = transport.run(&["true".to_string()]).await.unwrap_err();
    assert!(matches!(err, TransportError::Connect { .. }));
}

#[test]
fn serializing_drops_the_connection_and_deserializing_restores_host() {
    let transport = SshPersistentTransport::new(
        ConnectionParameters::new("cluster.example.org").with_user("alice"),
    );
    let json = serde_json::to_string(&transport).unwrap();
    assert!(json.contains("cluster.example.org"));

    let restored: SshPersistentTransport = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.connection.host, "cluster.example.org");
    assert_eq!(restored.connection.user.as_deref(), Some("alice"));
    assert!(!format!("{restored:?}").contains("connected: true"));
}

#[test]
fn disconnect_clears_any_cached_session() {
    let transport = SshPersistentTransport::new(ConnectionParameters::new("example.org"));
    transport.disconnect();
    assert!(!format!("{transport:?}").contains("connected: true"));
}
