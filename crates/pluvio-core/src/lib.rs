//! # Pluvio Core
//!
//! Core library for Pluvio, a reputation-weighted sensor consensus
//! engine for parametric weather insurance.
//!
//! Independent weather reporters submit sensor readings; no reporter is
//! trusted individually. Each round the engine validates submissions,
//! aggregates the valid subset into a consensus value weighted by
//! reporter reputation, and rescores every contributor against that
//! value. Reputation is the only trust primitive: it decides both a
//! reporter's influence on future rounds and whether the reporter is
//! suspended.
//!
//! This crate provides:
//!
//! - **[`network`]**: The [`network::NetworkSupervisor`] owning the
//!   reporter registry, round orchestration, the bounded round log, and
//!   availability-fault injection.
//!
//! - **[`consensus`]**: Stateless round machinery: submission
//!   validation, quorum gating, reputation-weighted aggregation, and
//!   median diagnostics.
//!
//! - **[`reputation`]**: Scoring rules applied after every round:
//!   graduated rewards and penalties, severe-deviation deductions, and
//!   sticky suspension.
//!
//! - **[`config`]**: Layered configuration (defaults, TOML file,
//!   environment overrides) with load-time validation.
//!
//! ## Round Flow
//!
//! ```text
//! ReportBatch
//!      │
//!      ▼
//! ┌────────────┐
//! │ Validation │ ── stale / implausible / empty ──► excluded, logged
//! └─────┬──────┘
//!       │ valid (weighted by reputation snapshot)
//!       ▼
//! ┌────────────┐
//! │   Quorum   │ ── below quorum ──► InsufficientQuorum, no mutation
//! └─────┬──────┘
//!       │ met
//!       ▼
//! ┌────────────┐     ┌──────────────────┐
//! │ Aggregation│ ──► │ Reputation update │ ──► ConsensusRecord
//! │ Σ(v·r)/Σ(r)│     │ reward / penalty  │     appended to history
//! └────────────┘     └──────────────────┘
//! ```
//!
//! The whole sequence runs as one atomic transaction against the
//! registry; concurrent rounds never observe partial updates.

pub mod config;
pub mod consensus;
pub mod errors;
pub mod network;
pub mod reputation;
pub mod types;
pub mod utils;

pub use config::EngineConfig;
pub use consensus::{ConsensusMethod, ConsensusRecord, DataPoint};
pub use errors::EngineError;
pub use network::{
    reporter::{NetworkStats, Reporter, ReporterStatsSnapshot},
    NetworkSupervisor,
};
pub use reputation::ReputationTier;
pub use types::{ReadingKind, ReportBatch, ReporterSubmission, SensorReading};
