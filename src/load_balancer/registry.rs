//! Host registry.
//!
//! # Responsibilities
//! - Own the ordered host list (configuration order, duplicates allowed)
//! - Add/remove hosts without blocking concurrent readers
//! - Apply failure/success reports to per-host health state

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::time::Instant;
use url::Url;

use crate::config::HostOptions;
use crate::load_balancer::host::{FailureRecord, Host, HostStatus};
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;

/// Ordered set of hosts plus the cool-down policy applied to them.
#[derive(Debug)]
pub struct HostRegistry {
    /// Swapped wholesale on add/remove; readers keep their snapshot.
    hosts: ArcSwap<Vec<Arc<Host>>>,
    backoff: BackoffPolicy,
    failure_threshold: u32,
}

impl HostRegistry {
    pub fn new(backoff: BackoffPolicy, failure_threshold: u32) -> Self {
        Self {
            hosts: ArcSwap::from_pointee(Vec::new()),
            backoff,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Append a host in the available state.
    pub fn add_host(&self, url: Url, options: HostOptions) -> Arc<Host> {
        let host = Arc::new(Host::new(url, options));
        self.hosts.rcu(|hosts| {
            let mut next = Vec::clone(hosts);
            next.push(host.clone());
            next
        });
        tracing::debug!(host = %host.url(), "Host added to pool");
        metrics::record_host_available(host.url().as_str(), true);
        host
    }

    /// Remove every host with this address. Returns how many were removed.
    pub fn remove_host(&self, url: &Url) -> usize {
        let previous = self.hosts.rcu(|hosts| {
            hosts
                .iter()
                .filter(|h| h.url() != url)
                .cloned()
                .collect::<Vec<_>>()
        });
        let removed = previous.iter().filter(|h| h.url() == url).count();
        if removed > 0 {
            tracing::info!(host = %url, removed, "Host removed from pool");
        }
        removed
    }

    /// Current host list in configuration order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Host>>> {
        self.hosts.load_full()
    }

    pub fn len(&self) -> usize {
        self.hosts.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.load().is_empty()
    }

    pub fn statuses(&self, now: Instant) -> Vec<HostStatus> {
        self.hosts.load().iter().map(|h| h.status(now)).collect()
    }

    /// Available hosts in configuration order, starting at `start` and
    /// wrapping around.
    pub fn list_available(&self, start: usize, now: Instant) -> Vec<Arc<Host>> {
        available_from(&self.snapshot(), start, now)
    }

    pub fn mark_failure(&self, host: &Host, now: Instant) -> FailureRecord {
        let record = host.record_failure(now, &self.backoff, self.failure_threshold);
        if record.newly_disabled {
            tracing::info!(
                host = %host.url(),
                failures = record.failures,
                cooldown = ?record.cooldown,
                "Host disabled"
            );
            metrics::record_host_available(host.url().as_str(), false);
        }
        record
    }

    pub fn mark_success(&self, host: &Host) {
        if host.record_success() {
            tracing::info!(host = %host.url(), "Host recovered");
            metrics::record_host_available(host.url().as_str(), true);
        }
    }
}

/// `hosts` rotated to begin at `start` (mod len).
pub fn rotated(hosts: &[Arc<Host>], start: usize) -> Vec<Arc<Host>> {
    if hosts.is_empty() {
        return Vec::new();
    }
    let len = hosts.len();
    (0..len).map(|i| hosts[(start + i) % len].clone()).collect()
}

/// Available hosts in configuration order, rotated to begin at `start`
/// (mod the number of available hosts).
pub fn available_from(hosts: &[Arc<Host>], start: usize, now: Instant) -> Vec<Arc<Host>> {
    let available: Vec<Arc<Host>> = hosts
        .iter()
        .filter(|h| h.is_available(now))
        .cloned()
        .collect();
    rotated(&available, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn registry(names: &[&str]) -> HostRegistry {
        let registry = HostRegistry::new(
            BackoffPolicy::new(Duration::from_millis(100), 2.0, Duration::from_secs(1)),
            1,
        );
        for name in names {
            registry.add_host(
                format!("http://{}:8086", name).parse().unwrap(),
                HostOptions::default(),
            );
        }
        registry
    }

    fn names(hosts: &[Arc<Host>]) -> Vec<String> {
        hosts
            .iter()
            .map(|h| h.url().host_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_add_preserves_order_and_duplicates() {
        let r = registry(&["a", "b", "a"]);
        assert_eq!(r.len(), 3);
        assert_eq!(names(&r.snapshot()), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_list_available_wraps_from_start() {
        let r = registry(&["a", "b", "c"]);
        let now = Instant::now();
        assert_eq!(names(&r.list_available(0, now)), vec!["a", "b", "c"]);
        assert_eq!(names(&r.list_available(1, now)), vec!["b", "c", "a"]);
        assert_eq!(names(&r.list_available(5, now)), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_list_available_skips_cooling_hosts() {
        let r = registry(&["a", "b", "c"]);
        let now = Instant::now();
        let b = r.snapshot()[1].clone();
        let record = r.mark_failure(&b, now);
        assert!(record.newly_disabled);

        assert_eq!(names(&r.list_available(0, now)), vec!["a", "c"]);
        assert_eq!(names(&r.list_available(1, now)), vec!["c", "a"]);
        assert_eq!(names(&r.list_available(2, now)), vec!["a", "c"]);
        // Cool-down elapsed.
        assert_eq!(
            names(&r.list_available(1, now + Duration::from_millis(100))),
            vec!["b", "c", "a"]
        );
    }

    #[test]
    fn test_mark_success_clears_cooldown() {
        let r = registry(&["a"]);
        let now = Instant::now();
        let a = r.snapshot()[0].clone();
        r.mark_failure(&a, now);
        r.mark_failure(&a, now);
        assert_eq!(a.failures(), 2);

        r.mark_success(&a);
        assert_eq!(a.failures(), 0);
        assert_eq!(r.list_available(0, now).len(), 1);
    }

    #[test]
    fn test_remove_host_removes_all_matches() {
        let r = registry(&["a", "b", "a"]);
        let removed = r.remove_host(&"http://a:8086".parse().unwrap());
        assert_eq!(removed, 2);
        assert_eq!(names(&r.snapshot()), vec!["b"]);
        assert_eq!(r.remove_host(&"http://zzz:8086".parse().unwrap()), 0);
    }

    #[test]
    fn test_snapshot_survives_removal() {
        let r = registry(&["a", "b"]);
        let before = r.snapshot();
        r.remove_host(&"http://a:8086".parse().unwrap());
        assert_eq!(before.len(), 2);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_concurrent_failure_reports_are_not_lost() {
        let r = Arc::new(registry(&["a"]));
        let host = r.snapshot()[0].clone();
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = r.clone();
                let host = host.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        r.mark_failure(&host, now);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(host.failures(), 800);
        assert_eq!(host.disabled_until(), Some(now + Duration::from_secs(1)));
    }
}
