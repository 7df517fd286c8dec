//! Stateless validation of incoming submissions.
//!
//! Validation runs before a submission may influence consensus. A
//! rejected submission is excluded from the round and has no reputation
//! effect. Structural invalidity is distinct from value deviation, and
//! only valid-but-deviant reports are ever penalized.

use crate::{
    consensus::config::ConsensusConfig,
    types::{ReadingKind, ReporterSubmission},
};
use chrono::{DateTime, Utc};

/// Why a submission was excluded from the round.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Older than the freshness window.
    Stale,
    /// Carried no readings at all.
    EmptyPayload,
    /// A reading fell outside its kind's plausibility range.
    OutOfRange { kind: ReadingKind, value: f64 },
    /// No reading of the round's metric kind was present.
    MissingMetric,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Stale => write!(f, "stale submission"),
            RejectReason::EmptyPayload => write!(f, "empty payload"),
            RejectReason::OutOfRange { kind, value } => {
                write!(f, "{} value {} out of range", kind.as_str(), value)
            }
            RejectReason::MissingMetric => write!(f, "no reading for round metric"),
        }
    }
}

/// Validates a submission against the round's metric and freshness
/// window, returning the extracted scalar on success.
///
/// All rules must hold:
/// 1. freshness: `now - received_at <= freshness_window`
/// 2. structural: at least one reading present
/// 3. plausibility: every reading within its kind's range
/// 4. the submission carries at least one reading of `metric`
///
/// # Errors
///
/// Returns the first [`RejectReason`] encountered, in rule order.
pub fn validate_submission(
    submission: &ReporterSubmission,
    metric: ReadingKind,
    now: DateTime<Utc>,
    config: &ConsensusConfig,
) -> Result<f64, RejectReason> {
    let age = now.signed_duration_since(submission.received_at);
    if age > config.freshness_window() {
        return Err(RejectReason::Stale);
    }

    if submission.readings.is_empty() {
        return Err(RejectReason::EmptyPayload);
    }

    for reading in &submission.readings {
        if !reading.is_plausible() || !reading.value.is_finite() {
            return Err(RejectReason::OutOfRange { kind: reading.kind, value: reading.value });
        }
    }

    submission.metric_mean(metric).ok_or(RejectReason::MissingMetric)
}
