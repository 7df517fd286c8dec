//! Reputation scoring rules.
//!
//! After every successful consensus round, each contributing reporter is
//! scored against the round's consensus value. Agreement earns a small
//! reward, deviation a penalty scaled by severity, and extreme deviation
//! an additional flat deduction. Reputation is domain-clamped to
//! `[0, 100]`; falling below the suspension threshold marks the reporter
//! suspended, and suspension is sticky until cleared administratively.

use crate::{network::reporter::Reporter, utils::round1};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Configuration for the reputation update rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Maximum acceptable deviation from consensus, in the same unit as
    /// the measured quantity (default: 10).
    #[serde(default = "default_max_deviation")]
    pub max_deviation: f64,

    /// Reputation below which a reporter is suspended (default: 30).
    #[serde(default = "default_suspension_threshold")]
    pub suspension_threshold: f64,

    /// Deviation beyond `severe_multiplier × max_deviation` triggers the
    /// severe penalty (default: 3).
    #[serde(default = "default_severe_multiplier")]
    pub severe_multiplier: f64,

    /// Flat deduction applied on severe deviation, on top of the
    /// ordinary penalty (default: 15).
    #[serde(default = "default_severe_penalty")]
    pub severe_penalty: f64,

    /// Bound on each reporter's performance history ring (default: 100).
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_max_deviation() -> f64 {
    10.0
}

fn default_suspension_threshold() -> f64 {
    30.0
}

fn default_severe_multiplier() -> f64 {
    3.0
}

fn default_severe_penalty() -> f64 {
    15.0
}

fn default_history_capacity() -> usize {
    100
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            max_deviation: default_max_deviation(),
            suspension_threshold: default_suspension_threshold(),
            severe_multiplier: default_severe_multiplier(),
            severe_penalty: default_severe_penalty(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// Human-readable trust bucket, a pure function of reputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl ReputationTier {
    /// Maps a reputation score to its tier. No hidden state: the same
    /// score always maps to the same tier.
    #[must_use]
    pub fn from_score(reputation: f64) -> Self {
        if reputation >= 90.0 {
            Self::Excellent
        } else if reputation >= 75.0 {
            Self::Good
        } else if reputation >= 50.0 {
            Self::Fair
        } else if reputation >= 30.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Static string for log fields and snapshots.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
        }
    }
}

/// One entry in a reporter's bounded performance history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub timestamp: DateTime<Utc>,
    pub deviation: f64,
    pub within_threshold: bool,
    pub consensus_value: f64,
    pub reporter_value: f64,
}

/// Record of the most recent severe-penalty event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyEvent {
    pub timestamp: DateTime<Utc>,
    pub reason: Cow<'static, str>,
    pub amount: f64,
}

/// Reason string attached to severe-deviation penalty events.
pub const SEVERE_DEVIATION_REASON: &str = "severe deviation";

/// Applies one round's outcome to a contributing reporter.
///
/// The ordinary penalty and the severe flat deduction both apply when
/// the severe threshold is crossed; the double deduction is the
/// documented behavior, not an accident. Suspension triggered here is
/// sticky; nothing in the engine clears it automatically.
pub fn apply_round_outcome(
    reporter: &mut Reporter,
    consensus_value: f64,
    reporter_value: f64,
    now: DateTime<Utc>,
    config: &ReputationConfig,
) {
    let deviation = (reporter_value - consensus_value).abs();
    let within_threshold = deviation <= config.max_deviation;

    reporter.push_sample(
        PerformanceSample {
            timestamp: now,
            deviation,
            within_threshold,
            consensus_value,
            reporter_value,
        },
        config.history_capacity,
    );
    reporter.total_reports += 1;

    if within_threshold {
        reporter.accurate_reports += 1;
        let accuracy_ratio = 1.0 - deviation / config.max_deviation;
        let reward = round1(accuracy_ratio * 1.5 + 0.5);
        reporter.reputation = (reporter.reputation + reward).min(100.0);

        debug!(
            reporter = %reporter.id,
            deviation,
            reward,
            reputation = reporter.reputation,
            "reporter agreed with consensus"
        );
    } else {
        reporter.malicious_reports += 1;
        let severity_ratio = (deviation - config.max_deviation) / config.max_deviation;
        let penalty = round1((2.0 + severity_ratio * 3.0).min(10.0));
        reporter.reputation = (reporter.reputation - penalty).max(0.0);

        let severe = deviation > config.severe_multiplier * config.max_deviation;
        if severe {
            reporter.reputation = (reporter.reputation - config.severe_penalty).max(0.0);
            reporter.last_penalty = Some(PenaltyEvent {
                timestamp: now,
                reason: Cow::Borrowed(SEVERE_DEVIATION_REASON),
                amount: config.severe_penalty,
            });
        }

        warn!(
            reporter = %reporter.id,
            deviation,
            penalty,
            severe,
            reputation = reporter.reputation,
            "reporter deviated from consensus"
        );

        if reporter.reputation < config.suspension_threshold && !reporter.suspended {
            reporter.suspended = true;
            warn!(
                reporter = %reporter.id,
                reputation = reporter.reputation,
                threshold = config.suspension_threshold,
                "reporter suspended"
            );
        }
    }
}
