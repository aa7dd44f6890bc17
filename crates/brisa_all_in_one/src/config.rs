use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // MQTT configuration
    /// MQTT broker host
    #[serde(default = "default_mqtt_broker_host")]
    pub mqtt_broker_host: String,

    /// MQTT broker port
    #[serde(default = "default_mqtt_broker_port")]
    pub mqtt_broker_port: u16,

    /// Topic the stations publish readings on
    #[serde(default = "default_mqtt_topic")]
    pub mqtt_topic: String,

    /// MQTT client identifier
    #[serde(default = "default_mqtt_client_id")]
    pub mqtt_client_id: String,

    /// MQTT keep-alive interval in seconds
    #[serde(default = "default_mqtt_keep_alive_secs")]
    pub mqtt_keep_alive_secs: u64,

    /// Delay before reconnecting after a dropped session, in seconds
    #[serde(default = "default_mqtt_reconnect_delay_secs")]
    pub mqtt_reconnect_delay_secs: u64,

    // Downstream API configuration
    /// Base URL of the downstream station/measurement API
    #[serde(default = "default_downstream_base_url")]
    pub downstream_base_url: String,

    /// HTTP connect timeout in seconds
    #[serde(default = "default_http_connect_timeout_secs")]
    pub http_connect_timeout_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_request_timeout_secs")]
    pub http_request_timeout_secs: u64,

    // PostgreSQL configuration
    /// PostgreSQL host
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// PostgreSQL port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// PostgreSQL username
    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    /// PostgreSQL password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    /// Connection pool size
    #[serde(default = "default_postgres_pool_size")]
    pub postgres_pool_size: usize,

    /// Path to the staging store migrations directory
    #[serde(default = "default_postgres_migrations_dir")]
    pub postgres_migrations_dir: String,

    /// Path to the goose binary
    #[serde(default = "default_goose_binary_path")]
    pub goose_binary_path: String,

    // Reconciliation configuration
    /// Seconds between reconciliation passes
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Attempts for a staging store insert before the reading is dropped
    #[serde(default = "default_insert_retry_attempts")]
    pub insert_retry_attempts: u32,

    /// Delay between staging store insert attempts, in milliseconds
    #[serde(default = "default_insert_retry_delay_ms")]
    pub insert_retry_delay_ms: u64,

    /// Zero-match passes before a reading is quarantined
    #[serde(default = "default_zero_match_quarantine_after")]
    pub zero_match_quarantine_after: i32,

    // Simulator configuration
    /// Enable the synthetic reading generator
    #[serde(default = "default_simulator_enabled")]
    pub simulator_enabled: bool,

    /// Seconds between simulator ticks
    #[serde(default = "default_simulator_interval_secs")]
    pub simulator_interval_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

// MQTT defaults
fn default_mqtt_broker_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_broker_port() -> u16 {
    1883
}

fn default_mqtt_topic() -> String {
    "api-fatec/estacao/dados/".to_string()
}

fn default_mqtt_client_id() -> String {
    "brisa-ingest".to_string()
}

fn default_mqtt_keep_alive_secs() -> u64 {
    30
}

fn default_mqtt_reconnect_delay_secs() -> u64 {
    5
}

// Downstream API defaults
fn default_downstream_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_http_connect_timeout_secs() -> u64 {
    5
}

fn default_http_request_timeout_secs() -> u64 {
    10
}

// PostgreSQL defaults
fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "brisa".to_string()
}

fn default_postgres_username() -> String {
    "brisa".to_string()
}

fn default_postgres_password() -> String {
    "brisa".to_string()
}

fn default_postgres_pool_size() -> usize {
    5
}

fn default_postgres_migrations_dir() -> String {
    "crates/brisa-postgres/migrations".to_string()
}

fn default_goose_binary_path() -> String {
    "goose".to_string()
}

// Reconciliation defaults
fn default_sync_interval_secs() -> u64 {
    31
}

fn default_insert_retry_attempts() -> u32 {
    3
}

fn default_insert_retry_delay_ms() -> u64 {
    500
}

fn default_zero_match_quarantine_after() -> i32 {
    10
}

// Simulator defaults
fn default_simulator_enabled() -> bool {
    false
}

fn default_simulator_interval_secs() -> u64 {
    30
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("BRISA"))
            .build()?
            .try_deserialize()
    }
}
