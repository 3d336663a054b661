//! Host abstraction.
//!
//! # Responsibilities
//! - Represent a single database node (base URL + transport options)
//! - Track consecutive failures and the cool-down deadline
//! - Answer "is this host selectable right now?"

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::config::HostOptions;
use crate::resilience::backoff::BackoffPolicy;

/// Health state derived from the cool-down deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Available,
    Disabled,
}

#[derive(Debug, Default, Clone, Copy)]
struct HealthRecord {
    failures: u32,
    disabled_until: Option<Instant>,
}

/// What a reported failure did to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    /// Consecutive failures including this one.
    pub failures: u32,
    /// Cool-down applied, if the failure threshold was reached.
    pub cooldown: Option<Duration>,
    /// True when the host was available before this failure.
    pub newly_disabled: bool,
}

/// Point-in-time view of one host, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    pub url: Url,
    pub state: HealthState,
    pub failures: u32,
    pub disabled_until: Option<Instant>,
}

/// A single database node.
#[derive(Debug)]
pub struct Host {
    url: Url,
    options: HostOptions,
    /// `failures` and `disabled_until` change together under one lock.
    health: Mutex<HealthRecord>,
}

impl Host {
    pub fn new(url: Url, options: HostOptions) -> Self {
        Self {
            url,
            options,
            health: Mutex::new(HealthRecord::default()),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    fn health(&self) -> MutexGuard<'_, HealthRecord> {
        // The record is plain data; a panic elsewhere cannot leave it half-written.
        self.health.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn failures(&self) -> u32 {
        self.health().failures
    }

    pub fn disabled_until(&self) -> Option<Instant> {
        self.health().disabled_until
    }

    /// Available iff no cool-down is set or it has elapsed at `now`.
    pub fn is_available(&self, now: Instant) -> bool {
        match self.health().disabled_until {
            Some(until) => now >= until,
            None => true,
        }
    }

    pub fn state(&self, now: Instant) -> HealthState {
        if self.is_available(now) {
            HealthState::Available
        } else {
            HealthState::Disabled
        }
    }

    pub fn status(&self, now: Instant) -> HostStatus {
        let record = *self.health();
        let available = record.disabled_until.map_or(true, |until| now >= until);
        HostStatus {
            url: self.url.clone(),
            state: if available {
                HealthState::Available
            } else {
                HealthState::Disabled
            },
            failures: record.failures,
            disabled_until: record.disabled_until,
        }
    }

    /// Count a failed request and, once `threshold` consecutive failures
    /// are reached, start a cool-down of `backoff.cooldown(failures)`.
    pub(crate) fn record_failure(
        &self,
        now: Instant,
        backoff: &BackoffPolicy,
        threshold: u32,
    ) -> FailureRecord {
        let mut health = self.health();
        let was_available = health.disabled_until.map_or(true, |until| now >= until);

        health.failures = health.failures.saturating_add(1);
        let cooldown = if health.failures >= threshold {
            let cooldown = backoff.cooldown(health.failures);
            health.disabled_until = Some(now + cooldown);
            Some(cooldown)
        } else {
            None
        };

        FailureRecord {
            failures: health.failures,
            cooldown,
            newly_disabled: was_available && cooldown.is_some(),
        }
    }

    /// Reset failures and clear any cool-down. Returns true if the host had
    /// been failing.
    pub(crate) fn record_success(&self) -> bool {
        let mut health = self.health();
        let was_failing = health.failures > 0 || health.disabled_until.is_some();
        health.failures = 0;
        health.disabled_until = None;
        was_failing
    }
}
