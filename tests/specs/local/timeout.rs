use pbatch_core::{JobState, LaunchParameters};
use pbatch_plugins::{Job, LocalJob};
use tempfile::tempdir;

#[tokio::test]
async fn wall_time_expiry_fails_the_job_with_sigterm_exit_code() {
    let dir = tempdir().unwrap();
    // "0:01" is minutes:seconds per the Slurm wall-time grammar -- one second.
    let launch = LaunchParameters::new(["sleep", "3"], dir.path().to_str().unwrap()).with_wall_time("0:01");
    let mut job = LocalJob::new(launch);

    job.submit().await.unwrap();
    job.wait().await.unwrap();

    assert_eq!(job.state().await.unwrap(), JobState::Failed);
    assert_eq!(job.exit_code().await, Some(-15));
}
