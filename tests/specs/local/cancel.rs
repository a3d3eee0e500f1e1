use crate::prelude::local_job;
use pbatch_core::JobState;
use pbatch_plugins::Job;
use tempfile::tempdir;

#[tokio::test]
async fn cancel_then_wait_leaves_the_job_failed_and_wakeup_file_absent() {
    let dir = tempdir().unwrap();
    let mut job = local_job(dir.path(), &["sh", "-c", "sleep 10 && touch wakeup.txt"]);

    job.submit().await.unwrap();
    // Give the daemon a moment to spawn the child before signaling it.
    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    job.cancel().await.unwrap();
    job.wait().await.unwrap();

    assert_eq!(job.state().await.unwrap(), JobState::Failed);
    assert!(!dir.path().join("wakeup.txt").exists());
}
