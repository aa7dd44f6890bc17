use thiserror::Error;

/// Domain-specific error types for the telemetry bridge
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid reading payload: {0}")]
    InvalidReading(String),

    #[error("Station not registered: {0}")]
    StationUnknown(String),

    #[error("Station is inactive: {0}")]
    StationInactive(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Measurement rejected: {0}")]
    MeasurementRejected(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
