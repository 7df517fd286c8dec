//! Integration tests for availability-fault injection.
//!
//! All suites here run under paused tokio time so the reactivation
//! timers fire deterministically.

use crate::common::{supervisor_with, uniform_round};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_faulted_reporter_sits_out_then_returns() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    supervisor.inject_fault("c", Duration::from_secs(60)).await.unwrap();

    // The network is down to two eligible reporters: below quorum.
    let err = supervisor
        .submit_batch(uniform_round(&["a", "b", "c"], 10.0))
        .await
        .unwrap_err();
    assert!(err.is_round_failure());

    tokio::time::sleep(Duration::from_secs(61)).await;

    let record = supervisor.submit_batch(uniform_round(&["a", "b", "c"], 10.0)).await.unwrap();
    assert_eq!(record.participating_count, 3);

    // Faults are membership events only.
    let c = supervisor.reporter_stats("c").await.unwrap();
    assert!((c.reputation - 82.0).abs() < 1e-9); // one perfect round
    assert_eq!(c.total_reports, 1);
}

#[tokio::test(start_paused = true)]
async fn test_reinjected_fault_replaces_the_timer() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    supervisor.inject_fault("c", Duration::from_secs(3600)).await.unwrap();
    // A second injection supersedes the first; the reporter returns on
    // the new, shorter schedule.
    supervisor.inject_fault("c", Duration::from_secs(10)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(supervisor.reporter_stats("c").await.unwrap().active);

    // The superseded hour-long timer must not fire later in any form.
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(supervisor.reporter_stats("c").await.unwrap().active);
}

#[tokio::test(start_paused = true)]
async fn test_fault_does_not_touch_suspension() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 25.0)]).await;

    supervisor.inject_fault("b", Duration::from_secs(5)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;

    let b = supervisor.reporter_stats("b").await.unwrap();
    assert!(b.active);
    assert!(!b.suspended);
    assert!((b.reputation - 25.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_restores_all_faulted_reporters() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    supervisor.inject_fault("a", Duration::from_secs(3600)).await.unwrap();
    supervisor.inject_fault("b", Duration::from_secs(7200)).await.unwrap();

    supervisor.shutdown().await;

    for id in ["a", "b", "c"] {
        assert!(supervisor.reporter_stats(id).await.unwrap().active);
    }

    // Shutdown is idempotent and rounds still run afterwards.
    supervisor.shutdown().await;
    let record = supervisor.submit_batch(uniform_round(&["a", "b", "c"], 10.0)).await.unwrap();
    assert_eq!(record.participating_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_fault_on_unknown_reporter_is_an_error() {
    let supervisor = supervisor_with(&[("a", 80.0)]).await;
    assert!(supervisor.inject_fault("ghost", Duration::from_secs(5)).await.is_err());
}
