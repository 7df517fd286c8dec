//! Core type definitions for sensor readings, reports, and batches.
//!
//! # Type Categories
//!
//! ## Wire Types
//! - [`ReadingKind`], [`SensorReading`]: typed sensor measurements
//! - [`ReporterSubmission`], [`ReportBatch`]: per-round input from reporters
//!
//! ## Internal Types
//! - [`ValidReport`]: a submission that passed validation, paired with the
//!   reputation snapshot taken at round entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{ops::RangeInclusive, sync::Arc};

/// Kind of physical quantity a sensor reading measures.
///
/// Each kind carries a plausibility range used by validation; values
/// outside the range are rejected outright rather than flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    /// Rainfall in mm per reporting interval.
    Rainfall,
    /// Air temperature in °C.
    Temperature,
    /// Soil moisture percentage.
    SoilMoisture,
}

impl ReadingKind {
    /// Plausible value range for this kind of reading.
    #[must_use]
    pub fn plausible_range(self) -> RangeInclusive<f64> {
        match self {
            ReadingKind::Rainfall => 0.0..=100.0,
            ReadingKind::Temperature => -10.0..=50.0,
            ReadingKind::SoilMoisture => 0.0..=100.0,
        }
    }

    /// Unit suffix for display and log output.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            ReadingKind::Rainfall => "mm",
            ReadingKind::Temperature => "°C",
            ReadingKind::SoilMoisture => "%",
        }
    }

    /// Static string for structured log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingKind::Rainfall => "rainfall",
            ReadingKind::Temperature => "temperature",
            ReadingKind::SoilMoisture => "soil_moisture",
        }
    }
}

/// A single typed sensor measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub kind: ReadingKind,
    pub value: f64,
}

impl SensorReading {
    #[must_use]
    pub fn new(kind: ReadingKind, value: f64) -> Self {
        Self { kind, value }
    }

    /// Whether the value falls within the kind's plausibility range.
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.kind.plausible_range().contains(&self.value)
    }
}

/// One reporter's contribution to a consensus round.
///
/// Ephemeral: submissions exist only for the duration of the round that
/// consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterSubmission {
    /// Stable identifier of the reporter, unique within the network.
    pub reporter_id: Arc<str>,
    /// When the readings were captured. Submissions older than the
    /// freshness window are rejected, never scored.
    pub received_at: DateTime<Utc>,
    /// Typed readings carried by this submission. Must be non-empty.
    pub readings: Vec<SensorReading>,
}

impl ReporterSubmission {
    #[must_use]
    pub fn new(
        reporter_id: impl Into<Arc<str>>,
        received_at: DateTime<Utc>,
        readings: Vec<SensorReading>,
    ) -> Self {
        Self { reporter_id: reporter_id.into(), received_at, readings }
    }

    /// Mean value of readings matching `metric`, or `None` when the
    /// submission carries no reading of that kind.
    #[must_use]
    pub fn metric_mean(&self, metric: ReadingKind) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0u32;
        for reading in &self.readings {
            if reading.kind == metric {
                sum += reading.value;
                count += 1;
            }
        }
        (count > 0).then(|| sum / f64::from(count))
    }
}

/// A batch of submissions forming one consensus round.
///
/// The `metric` selects which scalar is extracted per submission (the
/// mean of that kind's readings) and aggregated into the round's
/// consensus value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBatch {
    pub metric: ReadingKind,
    pub submissions: Vec<ReporterSubmission>,
}

impl ReportBatch {
    #[must_use]
    pub fn new(metric: ReadingKind, submissions: Vec<ReporterSubmission>) -> Self {
        Self { metric, submissions }
    }
}

/// A validated submission paired with the contributing reporter's
/// reputation as it stood at round entry.
///
/// Consensus weighting must use `reputation_at_submission`, never the
/// post-round value, so that a round's own updates cannot feed back into
/// its weighting.
#[derive(Debug, Clone)]
pub struct ValidReport {
    pub reporter_id: Arc<str>,
    /// Scalar extracted for the round's metric.
    pub value: f64,
    /// Reputation snapshot taken before this round's update.
    pub reputation_at_submission: f64,
    /// Content fingerprint of the submission payload, for audit/dedup.
    pub fingerprint: u64,
}
