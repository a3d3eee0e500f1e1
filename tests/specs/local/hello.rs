use crate::prelude::local_job;
use pbatch_plugins::Job;
use tempfile::tempdir;

#[tokio::test]
async fn hello_prints_and_finishes_cleanly() {
    let dir = tempdir().unwrap();
    let mut job = local_job(dir.path(), &["sh", "-c", "echo 'Hello world !'"]);

    job.submit().await.unwrap();
    job.wait().await.unwrap();

    assert_eq!(job.state().await.unwrap(), pbatch_core::JobState::Finished);
    assert!(job.stdout().await.unwrap().contains("Hello world !"));
    assert_eq!(job.exit_code().await, Some(0));
}
