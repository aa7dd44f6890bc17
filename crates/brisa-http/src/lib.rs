//! REST clients for the downstream station catalog and measurement API.

pub mod catalog_client;
pub mod client;
pub mod conversions;
pub mod measurement_forwarder;
pub mod models;

pub use catalog_client::RestCatalogClient;
pub use client::{build_http_client, HttpClientConfig};
pub use measurement_forwarder::RestMeasurementForwarder;
pub use models::{MeasurementDto, ParameterDto, SensorDto, StationDto};
