//! Consensus record types and round metadata.

use crate::types::ReadingKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the round's aggregate value was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusMethod {
    /// Standard path: values weighted by each contributor's reputation
    /// snapshot.
    ReputationWeighted,
    /// Degenerate path: every contributing reputation was zero, so the
    /// round fell back to the unweighted arithmetic mean.
    UnweightedMean,
}

/// One contributor's entry in a consensus record, kept for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub reporter_id: Arc<str>,
    /// Scalar the reporter contributed for the round's metric.
    pub value: f64,
    /// Reputation used to weight the contribution (the snapshot taken
    /// at round entry, not the post-round value).
    pub reputation_used: f64,
    /// Content fingerprint of the underlying submission, for audit
    /// trails and duplicate detection.
    pub fingerprint: u64,
}

/// The outcome of one successful consensus round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusRecord {
    /// Which physical quantity this round aggregated.
    pub metric: ReadingKind,
    /// Reputation-weighted aggregate, the value downstream settlement
    /// acts upon.
    pub consensus_value: f64,
    /// Plain median of the same value set. Diagnostic only: it never
    /// feeds reputation scoring or payout decisions.
    pub median_value: f64,
    /// All contributing tuples, in submission order.
    pub data_points: Vec<DataPoint>,
    pub participating_count: usize,
    pub timestamp: DateTime<Utc>,
    pub method: ConsensusMethod,
}
