//! Core domain types and trait seams for the weather telemetry bridge.
//!
//! Everything transport-facing (MQTT, Postgres, the downstream REST API)
//! lives in sibling crates and plugs in through the traits defined in
//! [`repository`].

pub mod envelope;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod time;
pub mod types;

pub use envelope::RawReading;
pub use error::{DomainError, DomainResult};
pub use mapping::{derive_field_key, parameter_field_key, ParameterMapping, ResolvedField};
pub use repository::{CatalogClient, MeasurementForwarder, StagedReadingStore};
pub use time::unix_to_event_time;
pub use types::{
    Measurement, Parameter, ProcessingOutcome, Sensor, StageReadingInput, StagedReading, Station,
    StationStatus, ZeroMatchOutcome,
};

// Re-export mocks for downstream crates when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use repository::{MockCatalogClient, MockMeasurementForwarder, MockStagedReadingStore};
