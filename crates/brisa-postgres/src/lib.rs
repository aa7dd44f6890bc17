//! PostgreSQL staging store for the telemetry bridge.

pub mod client;
pub mod config;
pub mod migration;
pub mod retry;
pub mod staged_reading_store;

pub use client::PostgresClient;
pub use config::PostgresConfig;
pub use migration::MigrationRunner;
pub use retry::{with_retry, RetryPolicy};
pub use staged_reading_store::PostgresStagedReadingStore;
