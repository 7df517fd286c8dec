//! Shared utilities.

pub mod fingerprint;

/// Rounds to one decimal place, the precision the reputation rules
/// work in.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
