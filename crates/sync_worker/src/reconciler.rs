use brisa_domain::{
    unix_to_event_time, CatalogClient, DomainResult, Measurement, MeasurementForwarder, Parameter,
    ParameterMapping, ProcessingOutcome, StagedReading, StagedReadingStore,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What one reconciliation pass did, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Unprocessed readings in the snapshot.
    pub scanned: usize,
    /// Readings marked processed (at least one field forwarded).
    pub marked_processed: usize,
    /// Readings whose every forward attempt failed; retried next pass.
    pub forward_failed: usize,
    /// Readings that resolved zero parameters this pass.
    pub zero_match: usize,
    /// Zero-match readings that hit the quarantine cap this pass.
    pub quarantined: usize,
    /// Readings left untouched because their station or their accounting
    /// could not be resolved.
    pub skipped: usize,
}

enum RecordOutcome {
    Marked,
    ForwardFailed,
    ZeroMatch { quarantined: bool },
    Skipped,
}

/// One reconciliation pass over the staging store.
///
/// Flow per pass:
/// 1. Snapshot unprocessed readings, oldest first
/// 2. Fetch the parameter catalog once; an unreachable or empty catalog
///    skips the whole pass without touching any reading
/// 3. For each reading: resolve the station, map raw fields to parameters,
///    forward one measurement per resolved field, then record the outcome
///
/// Readings are handled in isolation; one reading's failure never aborts
/// the pass.
pub struct Reconciler {
    store: Arc<dyn StagedReadingStore>,
    catalog: Arc<dyn CatalogClient>,
    forwarder: Arc<dyn MeasurementForwarder>,
    quarantine_after: i32,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn StagedReadingStore>,
        catalog: Arc<dyn CatalogClient>,
        forwarder: Arc<dyn MeasurementForwarder>,
        quarantine_after: i32,
    ) -> Self {
        Self {
            store,
            catalog,
            forwarder,
            quarantine_after,
        }
    }

    #[instrument(name = "reconciliation_pass", skip_all)]
    pub async fn run_pass(&self) -> DomainResult<PassSummary> {
        let mut summary = PassSummary::default();

        // 1. Snapshot the backlog
        let readings = self.store.list_unprocessed().await?;
        if readings.is_empty() {
            debug!("no unprocessed readings");
            return Ok(summary);
        }

        // 2. One catalog fetch per pass. Skipping here leaves every reading
        //    untouched, so a catalog outage never counts against them.
        let parameters = match self.catalog.list_parameters().await {
            Ok(parameters) if !parameters.is_empty() => parameters,
            Ok(_) => {
                warn!("parameter catalog is empty, skipping pass");
                return Ok(summary);
            }
            Err(e) => {
                warn!(error = %e, "parameter catalog unavailable, skipping pass");
                return Ok(summary);
            }
        };

        // 3. Work the backlog in storage order
        for reading in &readings {
            summary.scanned += 1;
            match self.process_reading(reading, &parameters).await {
                RecordOutcome::Marked => summary.marked_processed += 1,
                RecordOutcome::ForwardFailed => summary.forward_failed += 1,
                RecordOutcome::ZeroMatch { quarantined } => {
                    summary.zero_match += 1;
                    if quarantined {
                        summary.quarantined += 1;
                    }
                }
                RecordOutcome::Skipped => summary.skipped += 1,
            }
        }

        info!(
            scanned = summary.scanned,
            marked_processed = summary.marked_processed,
            forward_failed = summary.forward_failed,
            zero_match = summary.zero_match,
            quarantined = summary.quarantined,
            skipped = summary.skipped,
            "reconciliation pass complete"
        );

        Ok(summary)
    }

    #[instrument(skip_all, fields(id = reading.id, station_uid = %reading.station_uid))]
    async fn process_reading(
        &self,
        reading: &StagedReading,
        parameters: &[Parameter],
    ) -> RecordOutcome {
        // An unresolvable station leaves the reading for the next pass
        let station = match self.catalog.fetch_station(&reading.station_uid).await {
            Ok(Some(station)) => station,
            Ok(None) => {
                warn!("station not in catalog, leaving reading unprocessed");
                return RecordOutcome::Skipped;
            }
            Err(e) => {
                warn!(error = %e, "station lookup failed, leaving reading unprocessed");
                return RecordOutcome::Skipped;
            }
        };

        let mapping = ParameterMapping::for_station(&station, parameters);
        let resolved = mapping.resolve(&reading.fields);

        debug!(
            mapped_parameters = mapping.len(),
            resolved_fields = resolved.len(),
            "reading resolved against station mapping"
        );

        if resolved.is_empty() {
            return self.record_zero_match(reading).await;
        }

        // Forward one measurement per resolved field. A failed field is not
        // retried within the pass; it gets another chance only if the whole
        // reading stays unprocessed.
        let measured_at = unix_to_event_time(reading.recorded_at);
        let total_count = resolved.len() as i32;
        let mut success_count = 0_i32;

        for field in &resolved {
            let measurement = Measurement {
                station_id: station.id,
                parameter_id: field.parameter_id,
                value: field.value,
                measured_at,
            };

            match self.forwarder.forward(&measurement).await {
                Ok(()) => {
                    success_count += 1;
                    debug!(
                        parameter = %field.parameter_name,
                        value = field.value,
                        "measurement forwarded"
                    );
                }
                Err(e) => {
                    error!(
                        parameter = %field.parameter_name,
                        error = %e,
                        "failed to forward measurement"
                    );
                }
            }
        }

        if success_count == 0 {
            warn!(
                attempted = total_count,
                "every forward attempt failed, leaving reading unprocessed"
            );
            return RecordOutcome::ForwardFailed;
        }

        let outcome = ProcessingOutcome {
            success_count,
            total_count,
            processed_at: Utc::now(),
        };

        match self.store.mark_processed(reading.id, outcome).await {
            Ok(true) => {
                info!(
                    success = success_count,
                    total = total_count,
                    "reading processed"
                );
                RecordOutcome::Marked
            }
            Ok(false) => {
                warn!("reading vanished before it could be marked processed");
                RecordOutcome::Marked
            }
            Err(e) => {
                // Forwards already went out; the reading will be forwarded
                // again next pass. Duplicate downstream writes are accepted.
                error!(error = %e, "failed to mark reading processed");
                RecordOutcome::ForwardFailed
            }
        }
    }

    async fn record_zero_match(&self, reading: &StagedReading) -> RecordOutcome {
        match self
            .store
            .record_zero_match(reading.id, self.quarantine_after)
            .await
        {
            Ok(Some(outcome)) => {
                if outcome.quarantined {
                    warn!(
                        zero_match_count = outcome.zero_match_count,
                        "reading repeatedly matched no parameters, quarantined"
                    );
                } else {
                    warn!(
                        zero_match_count = outcome.zero_match_count,
                        "reading matched no parameters, leaving unprocessed"
                    );
                }
                RecordOutcome::ZeroMatch {
                    quarantined: outcome.quarantined,
                }
            }
            Ok(None) => {
                debug!("reading vanished before zero-match accounting");
                RecordOutcome::Skipped
            }
            Err(e) => {
                error!(error = %e, "failed to record zero-match");
                RecordOutcome::Skipped
            }
        }
    }
}
