//! Failover HTTP client pool for a clustered time-series database.

pub mod client;
pub mod config;
pub mod health;
pub mod load_balancer;
pub mod observability;
pub mod pool;
pub mod resilience;
pub mod transport;

pub use client::{
    ClientError, ClientResult, InfluxClient, Privilege, QueryOptions, RetentionPolicyOptions,
    WriteOptions,
};
pub use config::schema::ClusterConfig;
pub use health::PingStats;
pub use pool::{LogicalRequest, Method, Pool, PoolError, PoolResult, Response};
pub use transport::{HttpTransport, Transport, TransportError};
