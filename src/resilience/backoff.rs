//! Exponential cool-down with optional jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::BackoffConfig;

/// Cool-down calculator shared by every host in a pool.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    base: Duration,
    growth_factor: f64,
    ceiling: Duration,
    jitter: f64,
}

impl BackoffPolicy {
    pub fn new(base: Duration, growth_factor: f64, ceiling: Duration) -> Self {
        Self {
            base,
            growth_factor,
            ceiling,
            jitter: 0.0,
        }
    }

    /// Add up to `ratio` of the computed delay at random (clamped to 0..=1).
    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Cool-down after `failures` consecutive failures:
    /// `min(ceiling, base * growth_factor^(failures - 1))`.
    pub fn cooldown(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(failures - 1).unwrap_or(i32::MAX);
        let delay_ns = self.base.as_nanos() as f64 * self.growth_factor.powi(exponent);
        let ceiling_ns = self.ceiling.as_nanos() as f64;

        if !delay_ns.is_finite() || delay_ns >= ceiling_ns {
            return self.ceiling;
        }

        let jittered = if self.jitter > 0.0 {
            let extra = rand::thread_rng().gen_range(0.0..=delay_ns * self.jitter);
            (delay_ns + extra).min(ceiling_ns)
        } else {
            delay_ns
        };
        Duration::from_nanos(jittered.round() as u64)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&BackoffConfig::default())
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_ms),
            config.growth_factor,
            Duration::from_millis(config.max_ms),
        )
        .with_jitter(config.jitter)
    }
}
