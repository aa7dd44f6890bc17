use brisa_domain::{
    parameter_field_key, CatalogClient, DomainResult, Parameter, StageReadingInput,
    StagedReadingStore,
};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Stages one synthetic reading per active station on a fixed cadence so
/// the pipeline can be exercised without real hardware.
///
/// Synthetic readings take the same staging path as real telemetry and the
/// reconciliation loop treats them identically. Disabled unless
/// configuration turns it on.
pub struct SimulatorWorker {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn StagedReadingStore>,
    interval: Duration,
}

impl SimulatorWorker {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn StagedReadingStore>,
        interval: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            interval,
        }
    }

    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        info!(interval_secs = self.interval.as_secs(), "starting simulator");

        loop {
            if ctx.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_tick().await {
                warn!(error = %e, "simulator tick failed");
            }

            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("simulator stopped");
        Ok(())
    }

    /// One tick: discover active stations and the parameter catalog, then
    /// stage one synthetic reading per station.
    #[instrument(name = "simulator_tick", skip_all)]
    async fn run_tick(&self) -> DomainResult<usize> {
        let stations = self.catalog.list_active_stations().await?;
        if stations.is_empty() {
            debug!("no active stations to simulate");
            return Ok(0);
        }

        let parameters = self.catalog.list_parameters().await?;
        if parameters.is_empty() {
            debug!("no parameters to simulate");
            return Ok(0);
        }

        let mut staged = 0;
        for station in &stations {
            let fields = synthesize_fields(&parameters);
            if fields.is_empty() {
                continue;
            }

            let input = StageReadingInput {
                station_uid: station.uid.clone(),
                recorded_at: Utc::now().timestamp(),
                fields,
            };

            match self.store.insert_reading(input).await {
                Ok(reading) => {
                    debug!(id = reading.id, station = %station.name, "synthetic reading staged");
                    staged += 1;
                }
                Err(e) => {
                    error!(station = %station.name, error = %e, "failed to stage synthetic reading");
                }
            }
        }

        info!(stations = stations.len(), staged, "simulator tick complete");
        Ok(staged)
    }
}

/// One value per catalog parameter, keyed the way the reconciler resolves
/// them, uniform in [0, 50) rounded to two decimals.
fn synthesize_fields(parameters: &[Parameter]) -> serde_json::Map<String, serde_json::Value> {
    let mut rng = rand::thread_rng();
    let mut fields = serde_json::Map::new();

    for parameter in parameters {
        let key = parameter_field_key(parameter);
        if key.is_empty() {
            continue;
        }
        let value = (rng.gen_range(0.0_f64..50.0) * 100.0).round() / 100.0;
        fields.insert(key, serde_json::json!(value));
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisa_domain::{
        DomainError, MockCatalogClient, MockStagedReadingStore, StagedReading, Station,
        StationStatus,
    };

    fn station(uid: &str) -> Station {
        Station {
            id: 1,
            uid: uid.to_string(),
            name: format!("Station {uid}"),
            status: StationStatus::Active,
            sensors: vec![],
        }
    }

    fn parameter(id: i64, name: &str, field_key: Option<&str>) -> Parameter {
        Parameter {
            id,
            name: name.to_string(),
            field_key: field_key.map(str::to_string),
        }
    }

    fn staged(input: &StageReadingInput) -> StagedReading {
        StagedReading {
            id: 1,
            station_uid: input.station_uid.clone(),
            recorded_at: input.recorded_at,
            fields: input.fields.clone(),
            processed: false,
            success_count: None,
            total_count: None,
            processed_at: None,
            zero_match_count: 0,
            quarantined: false,
            received_at: Utc::now(),
        }
    }

    fn worker(catalog: MockCatalogClient, store: MockStagedReadingStore) -> SimulatorWorker {
        SimulatorWorker::new(Arc::new(catalog), Arc::new(store), Duration::from_secs(30))
    }

    #[test]
    fn test_synthesize_fields_covers_every_keyed_parameter() {
        let parameters = vec![
            parameter(7, "Temperatura", Some("temp")),
            parameter(8, "Umidade do Ar", None),
        ];

        let fields = synthesize_fields(&parameters);

        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("temp"));
        assert!(fields.contains_key("umidadedoar"));

        for value in fields.values() {
            let value = value.as_f64().unwrap();
            assert!((0.0..50.0).contains(&value));
            // Two decimal places
            assert!(((value * 100.0).round() - value * 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_synthesize_fields_skips_unkeyable_parameter() {
        let parameters = vec![parameter(9, "???", None)];

        let fields = synthesize_fields(&parameters);

        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn test_tick_stages_one_reading_per_active_station() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_list_active_stations()
            .times(1)
            .return_once(|| Ok(vec![station("S1"), station("S2")]));
        catalog
            .expect_list_parameters()
            .times(1)
            .return_once(|| Ok(vec![parameter(7, "Temperatura", Some("temp"))]));

        let mut store = MockStagedReadingStore::new();
        store
            .expect_insert_reading()
            .withf(|input| input.fields.contains_key("temp"))
            .times(2)
            .returning(|input| Ok(staged(&input)));

        let staged_count = worker(catalog, store).run_tick().await.unwrap();

        assert_eq!(staged_count, 2);
    }

    #[tokio::test]
    async fn test_tick_continues_after_one_station_fails() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_list_active_stations()
            .times(1)
            .return_once(|| Ok(vec![station("S1"), station("S2")]));
        catalog
            .expect_list_parameters()
            .times(1)
            .return_once(|| Ok(vec![parameter(7, "Temperatura", Some("temp"))]));

        let mut store = MockStagedReadingStore::new();
        store
            .expect_insert_reading()
            .withf(|input| input.station_uid == "S1")
            .times(1)
            .returning(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("pool closed"))));
        store
            .expect_insert_reading()
            .withf(|input| input.station_uid == "S2")
            .times(1)
            .returning(|input| Ok(staged(&input)));

        let staged_count = worker(catalog, store).run_tick().await.unwrap();

        assert_eq!(staged_count, 1);
    }

    #[tokio::test]
    async fn test_tick_without_stations_skips_parameter_fetch() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_list_active_stations()
            .times(1)
            .return_once(|| Ok(vec![]));
        catalog.expect_list_parameters().times(0);

        let mut store = MockStagedReadingStore::new();
        store.expect_insert_reading().times(0);

        let staged_count = worker(catalog, store).run_tick().await.unwrap();

        assert_eq!(staged_count, 0);
    }

    #[tokio::test]
    async fn test_tick_propagates_catalog_outage() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_list_active_stations()
            .times(1)
            .return_once(|| Err(DomainError::CatalogUnavailable("refused".to_string())));

        let store = MockStagedReadingStore::new();

        let result = worker(catalog, store).run_tick().await;

        assert!(matches!(result, Err(DomainError::CatalogUnavailable(_))));
    }
}
