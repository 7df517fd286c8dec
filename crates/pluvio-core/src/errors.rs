//! Engine error taxonomy.
//!
//! Nothing in this crate is fatal to the process: every failure is a
//! typed result the caller must branch on. Structural rejection of a
//! single bad submission is *not* an error; rejected submissions are
//! logged and excluded from the round without affecting anyone's
//! reputation.

use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the consensus engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// Fewer valid reports arrived than the configured quorum. No
    /// consensus record is emitted and no reputations change for the
    /// round. This is an explicit failure value, never a silently
    /// degraded consensus.
    #[error("insufficient quorum: {participating} participating, {required} required")]
    InsufficientQuorum { participating: usize, required: usize },

    /// A query referenced a reporter id that is not registered.
    #[error("unknown reporter: {0}")]
    UnknownReporter(Arc<str>),

    /// Attempted to admit a reporter under an id that already exists.
    #[error("reporter already registered: {0}")]
    DuplicateReporter(Arc<str>),

    /// Configuration failed validation at load time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Underlying configuration source error (file parse, env var).
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl EngineError {
    /// Returns `true` when the error is a per-round outcome the caller
    /// should expect during normal operation (as opposed to a setup or
    /// configuration defect).
    #[must_use]
    pub fn is_round_failure(&self) -> bool {
        matches!(self, Self::InsufficientQuorum { .. })
    }
}
