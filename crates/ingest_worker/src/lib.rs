//! MQTT ingest worker: subscribes to station telemetry and stages every
//! valid reading for the reconciliation loop.

pub mod ingestor;
pub mod listener;

pub use ingestor::ReadingIngestor;
pub use listener::{MqttListener, MqttListenerConfig};
