//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, growth >= 1)
//! - Reject configurations that could never dispatch (no hosts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClusterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{BackoffConfig, ClusterConfig, HostConfig, PoolConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no hosts configured")]
    NoHosts,

    #[error("host #{index}: unsupported protocol '{protocol}'")]
    UnsupportedProtocol { index: usize, protocol: String },

    #[error("host #{index}: hostname is empty")]
    EmptyHostname { index: usize },

    #[error("host #{index}: port must be non-zero")]
    ZeroPort { index: usize },

    #[error("host #{index}: timeout_ms must be non-zero")]
    ZeroHostTimeout { index: usize },

    #[error("host #{index}: '{address}' is not a valid base address")]
    InvalidAddress { index: usize, address: String },

    #[error("pool.max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("pool.failure_threshold must be at least 1")]
    ZeroFailureThreshold,

    #[error("pool.request_timeout_ms must be non-zero")]
    ZeroRequestTimeout,

    #[error("pool.probe_path must not be empty")]
    EmptyProbePath,

    #[error("pool.backoff.base_ms must be non-zero")]
    ZeroBackoffBase,

    #[error("pool.backoff.growth_factor must be a finite number >= 1.0 (got {0})")]
    InvalidGrowthFactor(f64),

    #[error("pool.backoff.base_ms ({base_ms}) exceeds max_ms ({max_ms})")]
    BackoffBaseAboveMax { base_ms: u64, max_ms: u64 },

    #[error("pool.backoff.jitter must be within 0.0..=1.0 (got {0})")]
    InvalidJitter(f64),
}

/// Validate a whole cluster configuration.
pub fn validate_config(config: &ClusterConfig) -> Result<(), Vec<ValidationError>> {
    validate_pool_setup(&config.hosts, &config.pool)
}

/// Validate the host list and pool settings handed straight to `Pool::new`.
pub fn validate_pool_setup(
    hosts: &[HostConfig],
    pool: &PoolConfig,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if hosts.is_empty() {
        errors.push(ValidationError::NoHosts);
    }
    for (index, host) in hosts.iter().enumerate() {
        validate_host(index, host, &mut errors);
    }
    validate_pool(pool, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_host(index: usize, host: &HostConfig, errors: &mut Vec<ValidationError>) {
    let mut well_formed = true;

    if host.protocol != "http" && host.protocol != "https" {
        errors.push(ValidationError::UnsupportedProtocol {
            index,
            protocol: host.protocol.clone(),
        });
        well_formed = false;
    }
    if host.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHostname { index });
        well_formed = false;
    }
    if host.port == 0 {
        errors.push(ValidationError::ZeroPort { index });
        well_formed = false;
    }
    if host.options.timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroHostTimeout { index });
    }

    if well_formed && host.base_url().is_err() {
        errors.push(ValidationError::InvalidAddress {
            index,
            address: format!("{}://{}:{}", host.protocol, host.host, host.port),
        });
    }
}

fn validate_pool(pool: &PoolConfig, errors: &mut Vec<ValidationError>) {
    if pool.max_attempts == Some(0) {
        errors.push(ValidationError::ZeroMaxAttempts);
    }
    if pool.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold);
    }
    if pool.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if pool.probe_path.is_empty() {
        errors.push(ValidationError::EmptyProbePath);
    }
    validate_backoff(&pool.backoff, errors);
}

fn validate_backoff(backoff: &BackoffConfig, errors: &mut Vec<ValidationError>) {
    if backoff.base_ms == 0 {
        errors.push(ValidationError::ZeroBackoffBase);
    }
    if !backoff.growth_factor.is_finite() || backoff.growth_factor < 1.0 {
        errors.push(ValidationError::InvalidGrowthFactor(backoff.growth_factor));
    }
    if backoff.base_ms > backoff.max_ms {
        errors.push(ValidationError::BackoffBaseAboveMax {
            base_ms: backoff.base_ms,
            max_ms: backoff.max_ms,
        });
    }
    if !(0.0..=1.0).contains(&backoff.jitter) {
        errors.push(ValidationError::InvalidJitter(backoff.jitter));
    }
}
