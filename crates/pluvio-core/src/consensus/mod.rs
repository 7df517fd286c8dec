//! Consensus round pipeline: validation, quorum gating, and weighted
//! aggregation.
//!
//! The pieces here are stateless; round orchestration and state
//! mutation live in [`crate::network`].

pub mod config;
pub mod quorum;
pub mod types;
pub mod validation;

pub use config::ConsensusConfig;
pub use types::{ConsensusMethod, ConsensusRecord, DataPoint};
pub use validation::{validate_submission, RejectReason};
