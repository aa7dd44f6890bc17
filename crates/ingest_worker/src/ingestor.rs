use brisa_domain::{
    CatalogClient, DomainError, DomainResult, RawReading, StageReadingInput, StagedReading,
    StagedReadingStore,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Turns one inbound transport message into one staged reading.
///
/// Flow:
/// 1. Decode the JSON envelope (station uid, unix timestamp, open numeric
///    fields)
/// 2. Confirm the station is registered and active in the catalog
/// 3. Stage the reading for the reconciliation loop
///
/// Nothing is forwarded downstream here; a staged reading is picked up by
/// the sync worker on its own cadence.
pub struct ReadingIngestor {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn StagedReadingStore>,
}

impl ReadingIngestor {
    pub fn new(catalog: Arc<dyn CatalogClient>, store: Arc<dyn StagedReadingStore>) -> Self {
        Self { catalog, store }
    }

    #[instrument(skip_all, fields(payload_size = payload.len()))]
    pub async fn ingest(&self, payload: &[u8]) -> DomainResult<StagedReading> {
        // 1. Decode the envelope
        let reading = RawReading::decode(payload)?;

        debug!(
            station_uid = %reading.station_uid,
            field_count = reading.fields.len(),
            "reading decoded"
        );

        // 2. The station must be registered and active; readings that fail
        //    this check are dropped, never staged
        let station = self
            .catalog
            .fetch_station(&reading.station_uid)
            .await?
            .ok_or_else(|| DomainError::StationUnknown(reading.station_uid.clone()))?;

        if !station.is_active() {
            return Err(DomainError::StationInactive(reading.station_uid.clone()));
        }

        // 3. Stage for the reconciliation loop
        let staged = self
            .store
            .insert_reading(StageReadingInput {
                station_uid: reading.station_uid,
                recorded_at: reading.recorded_at,
                fields: reading.fields,
            })
            .await?;

        debug!(id = staged.id, "reading staged");
        Ok(staged)
    }
}
