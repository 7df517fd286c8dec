//! Network supervision: reporter registry, round orchestration, and
//! availability-fault injection.
//!
//! The supervisor owns all mutable state. A consensus round is a single
//! atomic transaction against the registry: `submit_batch` holds the
//! write lock for the whole validate → aggregate → rescore sequence, so
//! concurrent rounds never interleave partial updates and every weight
//! comes from one consistent reputation snapshot taken at round entry.
//! Read-only queries take the shared lock and may run concurrently.

pub mod faults;
pub mod reporter;

use crate::{
    config::EngineConfig,
    consensus::{quorum, validation::validate_submission, ConsensusRecord},
    errors::EngineError,
    reputation::apply_round_outcome,
    types::{ReportBatch, ValidReport},
    utils::fingerprint::fingerprint_submission,
};
use arc_swap::ArcSwap;
use chrono::Utc;
use faults::FaultInjector;
use reporter::{NetworkStats, Reporter, ReporterStatsSnapshot};
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Owns the reporter set, enforces quorum, and publishes consensus
/// records.
pub struct NetworkSupervisor {
    /// Engine configuration, swappable at runtime without blocking
    /// in-flight rounds.
    config: ArcSwap<EngineConfig>,
    registry: RwLock<HashMap<Arc<str>, Reporter>>,
    /// Bounded append-only log of successful rounds, newest last.
    rounds: RwLock<VecDeque<ConsensusRecord>>,
    faults: FaultInjector,
}

impl NetworkSupervisor {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            registry: RwLock::new(HashMap::new()),
            rounds: RwLock::new(VecDeque::new()),
            faults: FaultInjector::new(),
        }
    }

    /// Builds a supervisor with an initial reporter set. Initial
    /// reputations may be staggered to model heterogeneous trust.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateReporter`] on repeated ids.
    pub async fn with_reporters(
        config: EngineConfig,
        reporters: impl IntoIterator<Item = (Arc<str>, f64)>,
    ) -> Result<Self, EngineError> {
        let supervisor = Self::new(config);
        for (id, initial) in reporters {
            supervisor.admit_reporter(id, initial).await?;
        }
        Ok(supervisor)
    }

    /// Replaces the engine configuration at runtime.
    pub fn update_config(&self, config: EngineConfig) {
        self.config.store(Arc::new(config));
        info!("engine configuration updated");
    }

    /// Returns a copy of the current configuration.
    #[must_use]
    pub fn get_config(&self) -> EngineConfig {
        (**self.config.load()).clone()
    }

    /// Admits a new reporter into the network.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateReporter`] if the id is taken.
    pub async fn admit_reporter(
        &self,
        id: Arc<str>,
        initial_reputation: f64,
    ) -> Result<(), EngineError> {
        let mut registry = self.registry.write().await;
        if registry.contains_key(&id) {
            return Err(EngineError::DuplicateReporter(id));
        }
        info!(reporter = %id, reputation = initial_reputation, "reporter admitted");
        registry.insert(id.clone(), Reporter::new(id, initial_reputation));
        Ok(())
    }

    /// Runs one consensus round over a batch of submissions.
    ///
    /// Validates each submission, aggregates the valid subset weighted
    /// by the reputation snapshot taken at entry, then rescores every
    /// contributor against the new consensus value. The whole sequence
    /// runs under one write lock, so a failed round leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InsufficientQuorum`] when fewer valid
    /// reports arrive than the configured quorum; no reputation or
    /// counter changes are applied in that case.
    pub async fn submit_batch(&self, batch: ReportBatch) -> Result<ConsensusRecord, EngineError> {
        let start = Instant::now();
        let config = self.config.load_full();
        let now = Utc::now();

        let mut registry = self.registry.write().await;

        let mut valid: Vec<ValidReport> = Vec::with_capacity(batch.submissions.len());
        let mut seen: HashSet<Arc<str>> = HashSet::with_capacity(batch.submissions.len());
        for submission in &batch.submissions {
            let Some(reporter) = registry.get(submission.reporter_id.as_ref()) else {
                debug!(reporter = %submission.reporter_id, "submission from unknown reporter excluded");
                continue;
            };
            // Inactive reporters sit out entirely. Suspended ones still
            // contribute: their weight is already near zero.
            if !reporter.is_contributing() {
                debug!(reporter = %reporter.id, "submission from inactive reporter excluded");
                continue;
            }
            // One report per reporter per round: the first submission
            // claims the slot, later ones are excluded so a single
            // reporter can never satisfy quorum or be scored twice.
            if !seen.insert(reporter.id.clone()) {
                debug!(
                    reporter = %reporter.id,
                    fingerprint = fingerprint_submission(submission),
                    "duplicate submission in batch excluded"
                );
                continue;
            }
            match validate_submission(submission, batch.metric, now, &config.consensus) {
                Ok(value) => valid.push(ValidReport {
                    reporter_id: reporter.id.clone(),
                    value,
                    reputation_at_submission: reporter.reputation,
                    fingerprint: fingerprint_submission(submission),
                }),
                Err(reason) => {
                    debug!(reporter = %submission.reporter_id, %reason, "submission rejected");
                }
            }
        }

        let record = quorum::build_record(batch.metric, &valid, config.consensus.quorum, now)
            .map_err(|err| {
                warn!(
                    metric = batch.metric.as_str(),
                    participating = valid.len(),
                    required = config.consensus.quorum,
                    "round failed quorum"
                );
                err
            })?;

        for report in &valid {
            if let Some(reporter) = registry.get_mut(report.reporter_id.as_ref()) {
                apply_round_outcome(
                    reporter,
                    record.consensus_value,
                    report.value,
                    now,
                    &config.reputation,
                );
            }
        }
        // Append while still holding the registry lock so concurrent
        // rounds cannot interleave their records out of order.
        {
            let mut rounds = self.rounds.write().await;
            if rounds.len() >= config.history.round_capacity {
                rounds.pop_front();
            }
            rounds.push_back(record.clone());
        }
        drop(registry);

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            metric = batch.metric.as_str(),
            consensus = record.consensus_value,
            median = record.median_value,
            participating = record.participating_count,
            duration_ms,
            "consensus round complete"
        );

        Ok(record)
    }

    /// Read-only projection of one reporter's state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownReporter`] for an unregistered id.
    pub async fn reporter_stats(&self, id: &str) -> Result<ReporterStatsSnapshot, EngineError> {
        let registry = self.registry.read().await;
        registry
            .get(id)
            .map(ReporterStatsSnapshot::from_reporter)
            .ok_or_else(|| EngineError::UnknownReporter(Arc::from(id)))
    }

    /// Aggregate network health. Averages cover active, non-suspended
    /// reporters only; suspended reporters stay visible individually via
    /// [`Self::reporter_stats`].
    pub async fn network_stats(&self) -> NetworkStats {
        let registry = self.registry.read().await;

        let total_reporters = registry.len();
        let active_reporters = registry.values().filter(|r| r.active).count();
        let suspended_reporters = registry.values().filter(|r| r.suspended).count();

        let mut reputation_sum = 0.0;
        let mut accuracy_sum = 0.0;
        let mut healthy = 0usize;
        for reporter in registry.values().filter(|r| r.counts_toward_health()) {
            reputation_sum += reporter.reputation;
            accuracy_sum += reporter.accuracy_pct();
            healthy += 1;
        }

        #[allow(clippy::cast_precision_loss)]
        let divisor = if healthy == 0 { 1.0 } else { healthy as f64 };

        NetworkStats {
            total_reporters,
            active_reporters,
            suspended_reporters,
            average_reputation: reputation_sum / divisor,
            average_accuracy: accuracy_sum / divisor,
            timestamp: Utc::now(),
        }
    }

    /// The most recent consensus records, oldest first, at most `limit`.
    pub async fn recent_rounds(&self, limit: usize) -> Vec<ConsensusRecord> {
        let rounds = self.rounds.read().await;
        let skip = rounds.len().saturating_sub(limit);
        rounds.iter().skip(skip).cloned().collect()
    }

    /// Administrative activation toggle. Deactivation excludes the
    /// reporter from rounds without touching its trust state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownReporter`] for an unregistered id.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), EngineError> {
        let mut registry = self.registry.write().await;
        let reporter =
            registry.get_mut(id).ok_or_else(|| EngineError::UnknownReporter(Arc::from(id)))?;
        reporter.active = active;
        info!(reporter = %id, active, "reporter activation changed");
        Ok(())
    }

    /// Clears a suspension. Recovery is always an explicit
    /// administrative action; the engine never clears suspension on its
    /// own.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownReporter`] for an unregistered id.
    pub async fn clear_suspension(&self, id: &str) -> Result<(), EngineError> {
        let mut registry = self.registry.write().await;
        let reporter =
            registry.get_mut(id).ok_or_else(|| EngineError::UnknownReporter(Arc::from(id)))?;
        reporter.suspended = false;
        info!(reporter = %id, reputation = reporter.reputation, "suspension cleared");
        Ok(())
    }

    /// Marks a reporter inactive for `duration`, then reactivates it on
    /// a deferred, cancellable task. This is a membership event only;
    /// reputation is untouched in both directions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownReporter`] for an unregistered id.
    pub async fn inject_fault(
        self: &Arc<Self>,
        id: &str,
        duration: Duration,
    ) -> Result<(), EngineError> {
        let reporter_id = {
            let mut registry = self.registry.write().await;
            let reporter =
                registry.get_mut(id).ok_or_else(|| EngineError::UnknownReporter(Arc::from(id)))?;
            reporter.active = false;
            reporter.id.clone()
        };

        info!(reporter = %reporter_id, duration_ms = duration.as_millis() as u64, "fault injected");

        let supervisor = Arc::clone(self);
        let task_id = reporter_id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            supervisor.reactivate_after_fault(&task_id).await;
        });
        self.faults.register(reporter_id, task.abort_handle()).await;
        Ok(())
    }

    async fn reactivate_after_fault(&self, id: &str) {
        {
            let mut registry = self.registry.write().await;
            if let Some(reporter) = registry.get_mut(id) {
                reporter.active = true;
            }
        }
        self.faults.complete(id).await;
        info!(reporter = %id, "reporter reactivated after fault");
    }

    /// Cancels all outstanding fault timers and reactivates the affected
    /// reporters immediately, so shutdown never strands anyone inactive.
    pub async fn shutdown(&self) {
        let pending = self.faults.cancel_all().await;
        if pending.is_empty() {
            return;
        }
        let mut registry = self.registry.write().await;
        for id in pending {
            if let Some(reporter) = registry.get_mut(id.as_ref()) {
                reporter.active = true;
                info!(reporter = %id, "reporter reactivated on shutdown");
            }
        }
    }
}
