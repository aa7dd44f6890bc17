#![cfg(feature = "integration-tests")]

//! End-to-end pipeline tests: staged reading, reconciliation pass,
//! downstream delivery, outcome accounting. Uses a real Postgres
//! (testcontainers) and a mocked downstream API (mockito).
//!
//! Requires Docker and the goose binary. Run with:
//! `cargo test -p brisa_all_in_one --features integration-tests`

use brisa_domain::{StageReadingInput, StagedReadingStore};
use brisa_http::{build_http_client, HttpClientConfig, RestCatalogClient, RestMeasurementForwarder};
use brisa_postgres::{
    MigrationRunner, PostgresClient, PostgresConfig, PostgresStagedReadingStore, RetryPolicy,
};
use serde_json::json;
use std::sync::Arc;
use sync_worker::Reconciler;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

async fn setup_store() -> (ContainerAsync<Postgres>, Arc<PostgresStagedReadingStore>) {
    let container = Postgres::default()
        .start()
        .await
        .expect("failed to start postgres container");

    let host = container.get_host().await.expect("no container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("no mapped port");

    let goose_binary = which::which("goose").expect("goose binary not found on PATH");

    let config = PostgresConfig {
        host: host.to_string(),
        port,
        database: "postgres".to_string(),
        username: "postgres".to_string(),
        password: "postgres".to_string(),
        pool_size: 5,
        migrations_dir: format!(
            "{}/../brisa-postgres/migrations",
            env!("CARGO_MANIFEST_DIR")
        ),
        goose_binary_path: goose_binary.to_string_lossy().to_string(),
    };

    MigrationRunner::new(&config)
        .run_migrations()
        .await
        .expect("migrations failed");

    let client = PostgresClient::new(&config).expect("failed to build postgres client");
    client.ping().await.expect("postgres unreachable");

    let store = Arc::new(PostgresStagedReadingStore::new(
        client,
        RetryPolicy::default(),
    ));
    (container, store)
}

fn reconciler_against(
    server: &mockito::ServerGuard,
    store: Arc<PostgresStagedReadingStore>,
    quarantine_after: i32,
) -> Reconciler {
    let http = build_http_client(&HttpClientConfig::default()).expect("failed to build client");
    let catalog = Arc::new(RestCatalogClient::new(server.url(), http.clone()));
    let forwarder = Arc::new(RestMeasurementForwarder::new(server.url(), http));
    Reconciler::new(store, catalog, forwarder, quarantine_after)
}

#[tokio::test]
async fn test_staged_reading_flows_downstream_and_is_marked() {
    let (_container, store) = setup_store().await;

    let mut server = mockito::Server::new_async().await;
    let parameters_mock = server
        .mock("GET", "/parametros/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 7, "nome": "Temperatura", "json": "temp"}]"#)
        .expect(1)
        .create_async()
        .await;
    let station_mock = server
        .mock("GET", "/estacoes/uid/S1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": 3,
                "uid": "S1",
                "nome": "Station One",
                "status": "ativa",
                "sensores": [{"id": 7, "nome": "Temperatura"}]
            }"#,
        )
        .expect(1)
        .create_async()
        .await;
    let measurement_mock = server
        .mock("POST", "/medidas/")
        .match_body(mockito::Matcher::Json(json!({
            "estacao_id": 3,
            "parametro_id": 7,
            "valor": 21.5,
            "data_hora": "2023-11-14T22:13:20"
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let staged = store
        .insert_reading(StageReadingInput {
            station_uid: "S1".to_string(),
            recorded_at: 1_700_000_000,
            fields: json!({"temp": 21.5, "hum": 60})
                .as_object()
                .cloned()
                .unwrap(),
        })
        .await
        .unwrap();

    let reconciler = reconciler_against(&server, store.clone(), 10);

    // First pass forwards the mapped field and marks the reading
    let summary = reconciler.run_pass().await.unwrap();
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.marked_processed, 1);

    assert!(store.list_unprocessed().await.unwrap().is_empty());

    // Second pass finds nothing; no duplicate delivery
    let summary = reconciler.run_pass().await.unwrap();
    assert_eq!(summary.scanned, 0);

    parameters_mock.assert_async().await;
    station_mock.assert_async().await;
    measurement_mock.assert_async().await;

    // The staged id survives as the handle for the whole flow
    assert!(staged.id > 0);
}

#[tokio::test]
async fn test_unmapped_reading_is_quarantined_after_cap() {
    let (_container, store) = setup_store().await;

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/parametros/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 7, "nome": "Temperatura", "json": "temp"}]"#)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/estacoes/uid/S1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": 3,
                "uid": "S1",
                "nome": "Station One",
                "status": "ativa",
                "sensores": [{"id": 7, "nome": "Temperatura"}]
            }"#,
        )
        .expect(2)
        .create_async()
        .await;
    let measurement_mock = server
        .mock("POST", "/medidas/")
        .expect(0)
        .create_async()
        .await;

    store
        .insert_reading(StageReadingInput {
            station_uid: "S1".to_string(),
            recorded_at: 1_700_000_000,
            fields: json!({"mystery": 1.0}).as_object().cloned().unwrap(),
        })
        .await
        .unwrap();

    let reconciler = reconciler_against(&server, store.clone(), 2);

    let first = reconciler.run_pass().await.unwrap();
    assert_eq!(first.zero_match, 1);
    assert_eq!(first.quarantined, 0);
    assert_eq!(store.list_unprocessed().await.unwrap().len(), 1);

    let second = reconciler.run_pass().await.unwrap();
    assert_eq!(second.zero_match, 1);
    assert_eq!(second.quarantined, 1);

    // Quarantined readings leave the snapshot without ever being forwarded
    assert!(store.list_unprocessed().await.unwrap().is_empty());
    measurement_mock.assert_async().await;
}
