//! Availability-fault injection bookkeeping.
//!
//! The supervisor can take a reporter out of the membership for a
//! bounded duration to exercise quorum behavior under partial outages.
//! Reactivation runs on a deferred, cancellable tokio task; this module
//! tracks the outstanding tasks so shutdown can cancel them without
//! leaving any reporter permanently stuck inactive.

use std::{collections::HashMap, sync::Arc};
use tokio::{sync::Mutex, task::AbortHandle};

/// Tracks in-flight timed reactivations keyed by reporter id.
#[derive(Default)]
pub(crate) struct FaultInjector {
    pending: Mutex<HashMap<Arc<str>, AbortHandle>>,
}

impl FaultInjector {
    pub(crate) fn new() -> Self {
        Self { pending: Mutex::new(HashMap::new()) }
    }

    /// Registers a reactivation task for a reporter, cancelling any
    /// previous timer for the same id so faults don't stack.
    pub(crate) async fn register(&self, reporter_id: Arc<str>, handle: AbortHandle) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.insert(reporter_id, handle) {
            previous.abort();
        }
    }

    /// Removes the entry once a reactivation task has run.
    pub(crate) async fn complete(&self, reporter_id: &str) {
        self.pending.lock().await.remove(reporter_id);
    }

    /// Cancels every outstanding timer and returns the ids still
    /// awaiting reactivation, so the caller can restore them eagerly.
    pub(crate) async fn cancel_all(&self) -> Vec<Arc<str>> {
        let mut pending = self.pending.lock().await;
        let ids: Vec<Arc<str>> = pending.keys().cloned().collect();
        for (_, handle) in pending.drain() {
            handle.abort();
        }
        ids
    }

    #[cfg(test)]
    pub(crate) async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}
