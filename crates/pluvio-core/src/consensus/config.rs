//! Consensus configuration types and defaults.

use serde::{Deserialize, Serialize};

/// Configuration for the consensus round pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Minimum valid reports required before a consensus value may be
    /// computed (default: 3). Rounds below quorum fail explicitly.
    #[serde(default = "default_quorum")]
    pub quorum: usize,

    /// Maximum age of a submission before it is rejected as stale
    /// (default: 30 seconds). Stale reports are excluded, never scored.
    #[serde(default = "default_freshness_window_seconds")]
    pub freshness_window_seconds: u64,
}

fn default_quorum() -> usize {
    3
}

fn default_freshness_window_seconds() -> u64 {
    30
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            quorum: default_quorum(),
            freshness_window_seconds: default_freshness_window_seconds(),
        }
    }
}

impl ConsensusConfig {
    /// Freshness window as a chrono duration for timestamp comparisons.
    #[must_use]
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.freshness_window_seconds).unwrap_or(i64::MAX))
    }
}
