// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pbatch_transport::test_support::FakeTransport;
use tempfile::tempdir;

fn launch(dir: &std::path::Path) -> LaunchParameters {
    LaunchParameters::new(["true"], dir.to_str().unwrap())
}

#[test]
fn local_plugin_needs_no_transport() {
    let dir = tempdir().unwrap();
    let job = create_job("local", launch(dir.path()), None, None).unwrap();
    assert_eq!(job.jobid(), "");
}

#[test]
fn nobatch_plugin_requires_transport_and_daemonizer_path() {
    let dir = tempdir().unwrap();
    let err = create_job("nobatch", launch(dir.path()), None, None).unwrap_err();
    assert!(matches!(err, PluginError::SubmitFailed(_)));

    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());
    let job = create_job("nobatch", launch(dir.path()), Some(transport), Some(PathBuf::from("/bin/pbatchd"))).unwrap();
    assert_eq!(job.jobid(), "");
}

#[test]
fn slurm_plugin_requires_transport() {
    let dir = tempdir().unwrap();
    let err = create_job("slurm", launch(dir.path()), None, None).unwrap_err();
    assert!(matches!(err, PluginError::SubmitFailed(_)));

    let transport: Arc<dyn Transport> = Arc::new(FakeTransport::new());
    let job = create_job("slurm", launch(dir.path()), Some(transport), None).unwrap();
    assert_eq!(job.jobid(), "");
}

#[test]
fn unknown_plugin_name_fails_with_plugin_not_found() {
    let dir = tempdir().unwrap();
    let err = create_job("windows-hpc", launch(dir.path()), None, None).unwrap_err();
    assert!(matches!(err, PluginError::PluginNotFound(name) if name == "windows-hpc"));
}
