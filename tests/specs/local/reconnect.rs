use crate::prelude::local_job;
use pbatch_core::JobState;
use pbatch_plugins::{Job, LocalJob};
use tempfile::tempdir;

#[tokio::test]
async fn a_job_handle_survives_a_serialize_deserialize_round_trip() {
    let dir = tempdir().unwrap();
    let mut job = local_job(dir.path(), &["sh", "-c", "echo payload > output.txt"]);

    job.submit().await.unwrap();

    let reconnected: LocalJob = serde_json::from_str(&serde_json::to_string(&job).unwrap()).unwrap();
    drop(job);

    reconnected.wait().await.unwrap();
    assert_eq!(reconnected.state().await.unwrap(), JobState::Finished);

    let out_dir = tempdir().unwrap();
    reconnected.get(&["output.txt"], out_dir.path()).await.unwrap();
    let fetched = std::fs::read_to_string(out_dir.path().join("output.txt")).unwrap();
    assert_eq!(fetched.trim(), "payload");
}
