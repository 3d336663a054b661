//! Round-robin failover ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::time::Instant;

use crate::load_balancer::host::Host;
use crate::load_balancer::registry::{available_from, rotated};
use crate::load_balancer::FailoverPolicy;

/// Round-robin selector.
/// Stores a shared cursor that advances once per dispatch, whatever the outcome.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FailoverPolicy for RoundRobin {
    fn select_order(&self, hosts: &[Arc<Host>], now: Instant) -> Vec<Arc<Host>> {
        if hosts.is_empty() {
            return Vec::new();
        }

        // Rotation is over available hosts only.
        let start = self.counter.fetch_add(1, Ordering::Relaxed);
        let available = available_from(hosts, start, now);
        if !available.is_empty() {
            return available;
        }

        // Every host is cooling down: try them all rather than fail outright.
        tracing::debug!(
            host_count = hosts.len(),
            "All hosts disabled, falling back to full host list"
        );
        rotated(hosts, start)
    }
}
