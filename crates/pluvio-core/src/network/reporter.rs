//! Per-reporter trust state.

use crate::reputation::{PenaltyEvent, PerformanceSample, ReputationTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, sync::Arc};

/// A stateful reporter: the unit of validation and scoring.
///
/// Created once at network initialization (or admitted dynamically),
/// mutated exclusively by the reputation update after each consensus
/// round, never deleted; only deactivated or suspended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reporter {
    /// Stable identifier, unique within the network.
    pub id: Arc<str>,
    /// Trust score, domain-clamped to [0, 100]. Initial values may be
    /// staggered to model heterogeneous trust.
    pub reputation: f64,
    /// Administrative membership flag. Inactive reporters are excluded
    /// from all consensus rounds; distinct from suspension.
    pub active: bool,
    /// Set once reputation drops below the suspension threshold.
    /// Sticky: cleared only by an explicit administrative action.
    pub suspended: bool,
    pub total_reports: u64,
    pub accurate_reports: u64,
    pub malicious_reports: u64,
    /// Ring of the most recent performance samples, oldest evicted on
    /// overflow.
    pub performance_history: VecDeque<PerformanceSample>,
    /// Most recent severe-penalty event, if any.
    pub last_penalty: Option<PenaltyEvent>,
}

impl Reporter {
    #[must_use]
    pub fn new(id: Arc<str>, initial_reputation: f64) -> Self {
        Self {
            id,
            reputation: initial_reputation.clamp(0.0, 100.0),
            active: true,
            suspended: false,
            total_reports: 0,
            accurate_reports: 0,
            malicious_reports: 0,
            performance_history: VecDeque::new(),
            last_penalty: None,
        }
    }

    /// Appends a performance sample, evicting the oldest entry when the
    /// ring is full.
    pub fn push_sample(&mut self, sample: PerformanceSample, capacity: usize) {
        if self.performance_history.len() >= capacity {
            self.performance_history.pop_front();
        }
        self.performance_history.push_back(sample);
    }

    /// Current trust tier, derived purely from reputation.
    #[must_use]
    pub fn tier(&self) -> ReputationTier {
        ReputationTier::from_score(self.reputation)
    }

    /// Share of reports that agreed with consensus, as a percentage.
    /// A reporter with no history is assumed trustworthy (100).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy_pct(&self) -> f64 {
        if self.total_reports == 0 {
            100.0
        } else {
            self.accurate_reports as f64 / self.total_reports as f64 * 100.0
        }
    }

    /// Whether this reporter's submissions enter consensus rounds.
    /// Suspended reporters still contribute (their weight is already
    /// near zero); only inactive ones are excluded.
    #[must_use]
    pub fn is_contributing(&self) -> bool {
        self.active
    }

    /// Whether this reporter counts toward network-health averages.
    #[must_use]
    pub fn counts_toward_health(&self) -> bool {
        self.active && !self.suspended
    }
}

/// Read-only projection of a reporter's state for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterStatsSnapshot {
    pub id: Arc<str>,
    pub reputation: f64,
    pub tier: ReputationTier,
    pub accuracy_pct: f64,
    pub total_reports: u64,
    pub accurate_reports: u64,
    pub malicious_reports: u64,
    pub active: bool,
    pub suspended: bool,
    pub last_penalty: Option<PenaltyEvent>,
}

impl ReporterStatsSnapshot {
    #[must_use]
    pub fn from_reporter(reporter: &Reporter) -> Self {
        Self {
            id: reporter.id.clone(),
            reputation: reporter.reputation,
            tier: reporter.tier(),
            accuracy_pct: reporter.accuracy_pct(),
            total_reports: reporter.total_reports,
            accurate_reports: reporter.accurate_reports,
            malicious_reports: reporter.malicious_reports,
            active: reporter.active,
            suspended: reporter.suspended,
            last_penalty: reporter.last_penalty.clone(),
        }
    }
}

/// Aggregate health of the network, computed over active and
/// non-suspended reporters so a few bad actors don't mask overall
/// health. Suspended reporters remain visible individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_reporters: usize,
    pub active_reporters: usize,
    pub suspended_reporters: usize,
    pub average_reputation: f64,
    pub average_accuracy: f64,
    pub timestamp: DateTime<Utc>,
}
