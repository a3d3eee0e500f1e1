use pbatch_core::{JobState, LaunchParameters};
use pbatch_plugins::{Job, LocalJob};
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;

fn write_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let script = dir.join("run.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[tokio::test]
async fn array_ok_writes_one_result_file_per_index_and_exits_zero() {
    let dir = tempdir().unwrap();
    let script = write_script(dir.path(), "echo \"$1\" > \"result_$1.txt\"\nexit 0");
    let launch = LaunchParameters::new([script.to_str().unwrap()], dir.path().to_str().unwrap()).with_array(4, 4);
    let mut job = LocalJob::new(launch);

    job.submit().await.unwrap();
    job.wait().await.unwrap();

    assert_eq!(job.state().await.unwrap(), JobState::Finished);
    assert_eq!(job.exit_code().await, Some(0));
    for idx in 0..4 {
        let path = dir.path().join(format!("result_{idx}.txt"));
        assert!(path.exists(), "missing {path:?}");
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), idx.to_string());
    }
}

#[tokio::test]
async fn array_fail_persists_the_failing_index_exit_code_but_runs_every_index() {
    let dir = tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "echo \"$1\" > \"result_$1.txt\"\n[ \"$1\" = \"3\" ] && exit 42\nexit 0",
    );
    let launch = LaunchParameters::new([script.to_str().unwrap()], dir.path().to_str().unwrap()).with_array(6, 6);
    let mut job = LocalJob::new(launch);

    job.submit().await.unwrap();
    job.wait().await.unwrap();

    assert_eq!(job.state().await.unwrap(), JobState::Failed);
    assert_eq!(job.exit_code().await, Some(42));
    for idx in 0..6 {
        let path = dir.path().join(format!("result_{idx}.txt"));
        assert!(path.exists(), "missing {path:?}");
    }
}
