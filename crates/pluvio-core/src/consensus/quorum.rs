//! Quorum-gated consensus aggregation.
//!
//! Stateless functions that combine one round's validated reports into a
//! single aggregate. Weighting by reputation is intentional: a single
//! high-trust reporter can outweigh several low-trust ones, which
//! converges trust and accuracy over repeated rounds and resists a
//! sudden influx of unproven reporters swaying the result.

use super::types::{ConsensusMethod, ConsensusRecord, DataPoint};
use crate::{errors::EngineError, types::ReadingKind, types::ValidReport};
use chrono::{DateTime, Utc};

/// Computes the reputation-weighted aggregate of a round's reports.
///
/// `Σ(value_i × reputation_i) / Σ(reputation_i)`. When every contributing
/// reputation is zero (degenerate round), falls back to the unweighted
/// arithmetic mean rather than dividing by zero; the returned method tag
/// records which path was taken.
///
/// Callers must enforce quorum before invoking; this function assumes a
/// non-empty slice.
#[must_use]
pub fn weighted_consensus(reports: &[ValidReport]) -> (f64, ConsensusMethod) {
    debug_assert!(!reports.is_empty());

    let total_weight: f64 = reports.iter().map(|r| r.reputation_at_submission).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = reports.len() as f64;

    if total_weight > 0.0 {
        let weighted_sum: f64 =
            reports.iter().map(|r| r.value * r.reputation_at_submission).sum();
        (weighted_sum / total_weight, ConsensusMethod::ReputationWeighted)
    } else {
        let sum: f64 = reports.iter().map(|r| r.value).sum();
        (sum / count, ConsensusMethod::UnweightedMean)
    }
}

/// Plain median of the round's values, attached to records for
/// diagnostic comparison against the weighted value. Never used for
/// scoring or payout decisions.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    debug_assert!(!values.is_empty());

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Builds the round's consensus record from validated reports.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientQuorum`] when fewer than `quorum`
/// reports are present. The caller must surface this as an explicit
/// failure, never a degraded value.
pub fn build_record(
    metric: ReadingKind,
    reports: &[ValidReport],
    quorum: usize,
    timestamp: DateTime<Utc>,
) -> Result<ConsensusRecord, EngineError> {
    if reports.len() < quorum {
        return Err(EngineError::InsufficientQuorum {
            participating: reports.len(),
            required: quorum,
        });
    }

    let (consensus_value, method) = weighted_consensus(reports);
    let values: Vec<f64> = reports.iter().map(|r| r.value).collect();
    let median_value = median(&values);

    let data_points = reports
        .iter()
        .map(|r| DataPoint {
            reporter_id: r.reporter_id.clone(),
            value: r.value,
            reputation_used: r.reputation_at_submission,
            fingerprint: r.fingerprint,
        })
        .collect();

    Ok(ConsensusRecord {
        metric,
        consensus_value,
        median_value,
        data_points,
        participating_count: reports.len(),
        timestamp,
        method,
    })
}
