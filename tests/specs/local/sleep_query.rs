use crate::prelude::local_job;
use pbatch_core::JobState;
use pbatch_plugins::Job;
use tempfile::tempdir;

#[tokio::test]
async fn sleep_then_query_observes_running_before_wait_completes() {
    let dir = tempdir().unwrap();
    let mut job = local_job(dir.path(), &["sh", "-c", "sleep 2 && touch wakeup.txt"]);

    job.submit().await.unwrap();
    let mid_state = job.state().await.unwrap();
    assert!(matches!(mid_state, JobState::Running | JobState::Queued));
    assert!(!dir.path().join("wakeup.txt").exists());

    job.wait().await.unwrap();

    assert!(dir.path().join("wakeup.txt").exists());
    assert_eq!(job.state().await.unwrap(), JobState::Finished);
}
