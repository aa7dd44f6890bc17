use crate::error::DomainResult;
use crate::types::{
    Measurement, Parameter, ProcessingOutcome, StageReadingInput, StagedReading, Station,
    ZeroMatchOutcome,
};
use async_trait::async_trait;

/// Staging store seam, implemented by the storage layer.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StagedReadingStore: Send + Sync {
    /// Durably stage a reading. Implementations retry transient store
    /// failures a bounded number of times before giving up.
    async fn insert_reading(&self, input: StageReadingInput) -> DomainResult<StagedReading>;

    /// Snapshot of readings still awaiting forwarding, oldest first.
    /// Quarantined readings are excluded.
    async fn list_unprocessed(&self) -> DomainResult<Vec<StagedReading>>;

    /// Mark a reading processed with its partial-success accounting.
    /// Idempotent; returns false when the reading no longer exists.
    async fn mark_processed(&self, id: i64, outcome: ProcessingOutcome) -> DomainResult<bool>;

    /// Record that a pass resolved zero parameters for a reading,
    /// quarantining it once the count reaches `quarantine_after`. Returns
    /// None when the reading no longer exists.
    async fn record_zero_match(
        &self,
        id: i64,
        quarantine_after: i32,
    ) -> DomainResult<Option<ZeroMatchOutcome>>;
}

/// Read-only client for the downstream station and parameter catalog.
///
/// Calls are single-attempt. Absence is `Ok(None)` or an empty list rather
/// than an error; transport failures surface as `CatalogUnavailable` so the
/// caller can treat the record as not yet resolvable.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_station(&self, uid: &str) -> DomainResult<Option<Station>>;

    async fn fetch_parameter(&self, id: i64) -> DomainResult<Option<Parameter>>;

    async fn list_parameters(&self) -> DomainResult<Vec<Parameter>>;

    async fn list_active_stations(&self) -> DomainResult<Vec<Station>>;
}

/// Seam for delivering one resolved measurement to the downstream API.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MeasurementForwarder: Send + Sync {
    /// Exactly one delivery attempt; callers own retry-by-re-forwarding.
    async fn forward(&self, measurement: &Measurement) -> DomainResult<()>;
}
