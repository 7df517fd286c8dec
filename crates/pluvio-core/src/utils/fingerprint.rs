//! Content fingerprinting for report payloads.
//!
//! Produces a deterministic `u64` fingerprint of a submission's readings
//! using `ahash`, without serializing to an intermediate string. The
//! fingerprint is attached to validated reports for audit trails and
//! duplicate detection; it is not a cryptographic commitment.

use crate::types::{ReporterSubmission, SensorReading};
use ahash::AHasher;
use std::hash::{Hash, Hasher};

/// Fingerprints a submission's payload (reporter id, capture time, and
/// every reading, in order).
///
/// Float values are hashed by their IEEE 754 bit pattern, with NaN
/// normalized to the canonical quiet NaN so semantically equal payloads
/// always collide.
#[must_use]
pub fn fingerprint_submission(submission: &ReporterSubmission) -> u64 {
    let mut hasher = AHasher::default();
    submission.reporter_id.hash(&mut hasher);
    submission.received_at.timestamp_micros().hash(&mut hasher);
    submission.readings.len().hash(&mut hasher);
    for reading in &submission.readings {
        hash_reading(reading, &mut hasher);
    }
    hasher.finish()
}

fn hash_reading(reading: &SensorReading, hasher: &mut impl Hasher) {
    reading.kind.as_str().hash(hasher);
    let bits = if reading.value.is_nan() {
        f64::NAN.to_bits()
    } else {
        reading.value.to_bits()
    };
    bits.hash(hasher);
}
