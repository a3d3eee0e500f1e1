// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pbatch_core::ConnectionParameters;
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;

/// Writes an executable shell stub standing in for `ssh`, so tests never
/// touch the network. The stub drops the destination argument and runs
/// the remainder locally, the way a real `ssh host cmd` would run `cmd`
/// on the remote shell.
fn write_ssh_stub(dir: &Path) -> String {
    let path = dir.join("ssh");
    std::fs::write(
        &path,
        "#!/bin/sh\nwhile [ \"$1\" = \"-o\" ]; do shift 2; done\nshift\nexec sh -c \"$1\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_str().unwrap().to_string()
}

/// Stub `scp -r <sources...> <dest>`: strips any `host:` prefix and copies
/// locally with `cp -r`.
fn write_scp_stub(dir: &Path) -> String {
    let path = dir.join("scp");
    std::fs::write(
        &path,
        "#!/bin/sh\nshift\nn=$#\ni=1\nsrcs=\"\"\nfor a in \"$@\"; do\n  if [ \"$i\" -eq \"$n\" ]; then dest=\"$a\"; else srcs=\"$srcs $a\"; fi\n  i=$((i+1))\ndone\n\
         dest=$(echo \"$dest\" | sed 's/^[^:]*://')\nfor s in $srcs; do\n  s=$(echo \"$s\" | sed 's/^[^:]*://')\n  cp -r \"$s\" \"$dest\"\ndone\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_str().unwrap().to_string()
}

#[tokio::test]
async fn run_strips_destination_and_executes_remote_command_locally() {
    let stub_dir = tempdir().unwrap();
    let ssh_path = write_ssh_stub(stub_dir.path());
    let transport = SshSubprocessTransport::new(ConnectionParameters::new("example.org"))
        .with_binaries(ssh_path, "scp");

    let out = transport.run(&["echo".to_string(), "hi there".to_string()]).await.unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "hi there");
}

#[tokio::test]
async fn run_surfaces_nonzero_exit_as_command_error() {
    let stub_dir = tempdir().unwrap();
    let ssh_path = write_ssh_stub(stub_dir.path());
    let transport = SshSubprocessTransport::new(ConnectionParameters::new("example.org"))
        .with_binaries(ssh_path, "scp");

    let err = transport
        .run(&["sh".to_string(), "-c".to_string(), "echo boom >&2; exit 5".to_string()])
        .await
        .unwrap_err();
    match err {
        TransportError::Command { code, stderr, .. } => {
            assert_eq!(code, 5);
            assert!(stderr.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_then_read_round_trip_via_stub() {
    let stub_dir = tempdir().unwrap();
    let ssh_path = write_ssh_stub(stub_dir.path());
    let work_dir = tempdir().unwrap();
    let remote_path = work_dir.path().join("state.json");

    let transport = SshSubprocessTransport::new(ConnectionParameters::new("example.org"))
        .with_binaries(ssh_path, "scp");

    transport.create(remote_path.to_str().unwrap(), "{\"ok\":true}").await.unwrap();
    let back = transport.read(remote_path.to_str().unwrap()).await.unwrap();
    assert_eq!(back, "{\"ok\":true}");
}

#[tokio::test]
async fn upload_copies_through_scp_stub() {
    let stub_dir = tempdir().unwrap();
    let ssh_path = write_ssh_stub(stub_dir.path());
    let scp_path = write_scp_stub(stub_dir.path());

    let src_dir = tempdir().unwrap();
    let dst_dir = tempdir().unwrap();
    let file = src_dir.path().join("payload.txt");
    std::fs::write(&file, "data").unwrap();

    let transport = SshSubprocessTransport::new(ConnectionParameters::new("example.org"))
        .with_binaries(ssh_path, scp_path);

    transport
        .upload(&[file.as_path()], dst_dir.path().to_str().unwrap())
        .await
        .unwrap();

    let copied = std::fs::read_to_string(dst_dir.path().join("payload.txt")).unwrap();
    assert_eq!(copied, "data");
}
