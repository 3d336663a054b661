//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or ClusterConfig built in code
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClusterConfig (validated, immutable)
//!     → Pool / InfluxClient construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; host changes go through `Pool::add_host`
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation runs at construction time, never per request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackoffConfig, ClusterConfig, HostConfig, HostOptions, ObservabilityConfig, PoolConfig,
};
pub use validation::{validate_config, ValidationError};
