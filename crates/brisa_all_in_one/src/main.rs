mod config;
mod telemetry;

use brisa_domain::{CatalogClient, MeasurementForwarder, StagedReadingStore};
use brisa_http::{build_http_client, HttpClientConfig, RestCatalogClient, RestMeasurementForwarder};
use brisa_postgres::{
    MigrationRunner, PostgresClient, PostgresConfig, PostgresStagedReadingStore, RetryPolicy,
};
use brisa_runner::Runner;
use config::ServiceConfig;
use ingest_worker::{MqttListener, MqttListenerConfig, ReadingIngestor};
use simulator::SimulatorWorker;
use std::sync::Arc;
use std::time::Duration;
use sync_worker::{Reconciler, SyncWorker};
use telemetry::{init_telemetry, TelemetryConfig};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {e}");
        std::process::exit(1);
    }

    info!("starting telemetry bridge");
    debug!("configuration: {:?}", config);

    // Staging store: migrations, pool, connectivity check
    let store = match initialize_staging_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "failed to initialize staging store");
            std::process::exit(1);
        }
    };
    let store: Arc<dyn StagedReadingStore> = Arc::new(store);

    // Downstream clients share one bounded-timeout HTTP client
    let http = match build_http_client(&HttpClientConfig {
        connect_timeout: Duration::from_secs(config.http_connect_timeout_secs),
        request_timeout: Duration::from_secs(config.http_request_timeout_secs),
    }) {
        Ok(http) => http,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let catalog: Arc<dyn CatalogClient> = Arc::new(RestCatalogClient::new(
        config.downstream_base_url.clone(),
        http.clone(),
    ));
    let forwarder: Arc<dyn MeasurementForwarder> = Arc::new(RestMeasurementForwarder::new(
        config.downstream_base_url.clone(),
        http,
    ));

    // Ingest path: MQTT listener backed by the catalog-validating ingestor
    let ingestor = Arc::new(ReadingIngestor::new(catalog.clone(), store.clone()));
    let listener = MqttListener::new(
        MqttListenerConfig {
            broker_host: config.mqtt_broker_host.clone(),
            broker_port: config.mqtt_broker_port,
            topic: config.mqtt_topic.clone(),
            client_id: config.mqtt_client_id.clone(),
            keep_alive: Duration::from_secs(config.mqtt_keep_alive_secs),
            reconnect_delay: Duration::from_secs(config.mqtt_reconnect_delay_secs),
        },
        ingestor,
    );

    // Forwarding path: periodic reconciliation over the staging store
    let reconciler = Reconciler::new(
        store.clone(),
        catalog.clone(),
        forwarder,
        config.zero_match_quarantine_after,
    );
    let sync_worker = SyncWorker::new(reconciler, Duration::from_secs(config.sync_interval_secs));

    let mut runner = Runner::new()
        .with_named_process("ingest_worker", move |ctx| listener.run(ctx))
        .with_named_process("sync_worker", move |ctx| sync_worker.run(ctx));

    if config.simulator_enabled {
        info!(
            interval_secs = config.simulator_interval_secs,
            "simulator enabled"
        );
        let simulator = SimulatorWorker::new(
            catalog.clone(),
            store.clone(),
            Duration::from_secs(config.simulator_interval_secs),
        );
        runner = runner.with_named_process("simulator", move |ctx| simulator.run(ctx));
    }

    runner
        .with_closer(|| async {
            info!("shutdown complete");
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10))
        .run()
        .await;
}

async fn initialize_staging_store(
    config: &ServiceConfig,
) -> anyhow::Result<PostgresStagedReadingStore> {
    let postgres_config = PostgresConfig {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        pool_size: config.postgres_pool_size,
        migrations_dir: config.postgres_migrations_dir.clone(),
        goose_binary_path: config.goose_binary_path.clone(),
    };

    MigrationRunner::new(&postgres_config).run_migrations().await?;

    let client = PostgresClient::new(&postgres_config)?;
    client.ping().await?;
    info!("staging store ready");

    let retry_policy = RetryPolicy {
        max_attempts: config.insert_retry_attempts,
        delay: Duration::from_millis(config.insert_retry_delay_ms),
    };

    Ok(PostgresStagedReadingStore::new(client, retry_policy))
}
