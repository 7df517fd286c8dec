//! Integration tests for the consensus-round lifecycle.
//!
//! These tests drive full rounds through the supervisor and verify:
//! - Reputation weighting shapes the consensus value
//! - Quorum requirements are enforced with no side effects
//! - Stale, implausible, and empty submissions are excluded, not scored
//! - The metric selector extracts the right readings from mixed payloads

use crate::common::{rainfall, rainfall_batch, submission, supervisor_with};
use chrono::Utc;
use pluvio_core::{
    ConsensusMethod, EngineError, ReadingKind, ReportBatch, ReporterSubmission, SensorReading,
};

#[tokio::test]
async fn test_equal_weights_reduce_to_mean_and_penalize_outliers() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 12.0),
            rainfall("b", 13.0),
            rainfall("c", 50.0),
        ]))
        .await
        .unwrap();

    // Equal weights: the weighted aggregate equals the arithmetic mean.
    assert!((record.consensus_value - 25.0).abs() < 1e-9);
    assert!((record.median_value - 13.0).abs() < 1e-9);
    assert_eq!(record.method, ConsensusMethod::ReputationWeighted);
    assert_eq!(record.participating_count, 3);

    // The outlier dragged consensus so far that every deviation exceeds
    // the tolerance of 10; all three take graduated penalties.
    let a = supervisor.reporter_stats("a").await.unwrap();
    let b = supervisor.reporter_stats("b").await.unwrap();
    let c = supervisor.reporter_stats("c").await.unwrap();
    assert!((a.reputation - 77.1).abs() < 1e-9); // deviation 13, penalty 2.9
    assert!((b.reputation - 77.4).abs() < 1e-9); // deviation 12, penalty 2.6
    assert!((c.reputation - 73.5).abs() < 1e-9); // deviation 25, penalty 6.5
    assert_eq!(c.malicious_reports, 1);
}

#[tokio::test]
async fn test_high_reputation_dominates_weighting() {
    let supervisor = supervisor_with(&[("trusted", 100.0), ("new-1", 10.0), ("new-2", 10.0)]).await;

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("trusted", 10.0),
            rainfall("new-1", 40.0),
            rainfall("new-2", 40.0),
        ]))
        .await
        .unwrap();

    // (10*100 + 40*10 + 40*10) / 120 = 15: one proven reporter outweighs
    // two unproven ones.
    assert!((record.consensus_value - 15.0).abs() < 1e-9);
    assert!((record.median_value - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_all_zero_reputation_falls_back_to_unweighted_mean() {
    let supervisor = supervisor_with(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]).await;

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 10.0),
            rainfall("b", 20.0),
            rainfall("c", 30.0),
        ]))
        .await
        .unwrap();

    assert!((record.consensus_value - 20.0).abs() < 1e-9);
    assert_eq!(record.method, ConsensusMethod::UnweightedMean);
}

#[tokio::test]
async fn test_quorum_failure_has_no_side_effects() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    let err = supervisor
        .submit_batch(rainfall_batch(vec![rainfall("a", 10.0), rainfall("b", 12.0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientQuorum { participating: 2, required: 3 }));
    assert!(err.is_round_failure());

    for id in ["a", "b", "c"] {
        let stats = supervisor.reporter_stats(id).await.unwrap();
        assert_eq!(stats.total_reports, 0);
        assert!((stats.reputation - 80.0).abs() < 1e-9);
        assert!(stats.last_penalty.is_none());
    }
    assert!(supervisor.recent_rounds(10).await.is_empty());
}

#[tokio::test]
async fn test_stale_submission_excluded_without_scoring() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0), ("d", 80.0)]).await;

    let mut stale = rainfall("d", 99.0);
    stale.received_at = Utc::now() - chrono::Duration::seconds(31);

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 10.0),
            rainfall("b", 11.0),
            rainfall("c", 12.0),
            stale,
        ]))
        .await
        .unwrap();

    assert_eq!(record.participating_count, 3);
    assert!(record.data_points.iter().all(|p| p.reporter_id.as_ref() != "d"));

    // Exclusion is structural: the stale reporter is neither rewarded
    // nor penalized.
    let d = supervisor.reporter_stats("d").await.unwrap();
    assert_eq!(d.total_reports, 0);
    assert!((d.reputation - 80.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_implausible_and_empty_submissions_excluded() {
    let supervisor =
        supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0), ("x", 80.0), ("y", 80.0)]).await;

    let empty = ReporterSubmission::new("x", Utc::now(), vec![]);
    let implausible = rainfall("y", 150.0); // above the 100mm ceiling

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 10.0),
            rainfall("b", 11.0),
            rainfall("c", 12.0),
            empty,
            implausible,
        ]))
        .await
        .unwrap();

    assert_eq!(record.participating_count, 3);
    for id in ["x", "y"] {
        let stats = supervisor.reporter_stats(id).await.unwrap();
        assert_eq!(stats.total_reports, 0);
        assert!((stats.reputation - 80.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_duplicate_submissions_cannot_fake_quorum() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    // A reporter replaying its own reading never reaches quorum alone
    // and is never scored for the failed round.
    let err = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 50.0),
            rainfall("a", 50.0),
            rainfall("a", 50.0),
        ]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientQuorum { participating: 1, required: 3 }));
    let a = supervisor.reporter_stats("a").await.unwrap();
    assert_eq!(a.total_reports, 0);
    assert!((a.reputation - 80.0).abs() < 1e-9);

    // In a mixed batch the first submission per reporter claims the
    // slot; the duplicate neither shifts consensus nor double-scores.
    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 10.0),
            rainfall("a", 90.0),
            rainfall("b", 10.0),
            rainfall("c", 10.0),
        ]))
        .await
        .unwrap();
    assert_eq!(record.participating_count, 3);
    assert!((record.consensus_value - 10.0).abs() < 1e-9);
    assert_eq!(supervisor.reporter_stats("a").await.unwrap().total_reports, 1);
}

#[tokio::test]
async fn test_record_data_points_carry_payload_fingerprints() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 10.0),
            rainfall("b", 11.0),
            rainfall("c", 12.0),
        ]))
        .await
        .unwrap();

    // Each contributing tuple keeps the content hash of its submission;
    // distinct payloads yield distinct fingerprints.
    let fingerprints: Vec<u64> = record.data_points.iter().map(|p| p.fingerprint).collect();
    assert_eq!(fingerprints.len(), 3);
    assert_ne!(fingerprints[0], fingerprints[1]);
    assert_ne!(fingerprints[1], fingerprints[2]);
}

#[tokio::test]
async fn test_metric_selector_ignores_other_reading_kinds() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    // Every submission carries both rainfall and temperature; only the
    // temperature readings feed a temperature round.
    let mixed = |id: &str, temp: f64| {
        ReporterSubmission::new(
            id,
            Utc::now(),
            vec![
                SensorReading::new(ReadingKind::Rainfall, 55.0),
                SensorReading::new(ReadingKind::Temperature, temp),
            ],
        )
    };

    let record = supervisor
        .submit_batch(ReportBatch::new(
            ReadingKind::Temperature,
            vec![mixed("a", 20.0), mixed("b", 22.0), mixed("c", 24.0)],
        ))
        .await
        .unwrap();

    assert_eq!(record.metric, ReadingKind::Temperature);
    assert!((record.consensus_value - 22.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_submission_missing_the_round_metric_is_excluded() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0), ("d", 80.0)]).await;

    let record = supervisor
        .submit_batch(rainfall_batch(vec![
            rainfall("a", 10.0),
            rainfall("b", 11.0),
            rainfall("c", 12.0),
            submission("d", ReadingKind::Temperature, 21.0),
        ]))
        .await
        .unwrap();

    assert_eq!(record.participating_count, 3);
    assert_eq!(supervisor.reporter_stats("d").await.unwrap().total_reports, 0);
}

#[tokio::test]
async fn test_multiple_readings_of_the_metric_are_averaged() {
    let supervisor = supervisor_with(&[("a", 80.0), ("b", 80.0), ("c", 80.0)]).await;

    let double = ReporterSubmission::new(
        "a",
        Utc::now(),
        vec![
            SensorReading::new(ReadingKind::Rainfall, 8.0),
            SensorReading::new(ReadingKind::Rainfall, 12.0),
        ],
    );

    let record = supervisor
        .submit_batch(rainfall_batch(vec![double, rainfall("b", 10.0), rainfall("c", 10.0)]))
        .await
        .unwrap();

    // a's two readings collapse to their mean of 10 before aggregation.
    assert!((record.consensus_value - 10.0).abs() < 1e-9);
    assert_eq!(record.participating_count, 3);
}
