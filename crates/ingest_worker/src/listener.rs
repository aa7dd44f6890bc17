use crate::ingestor::ReadingIngestor;
use anyhow::anyhow;
use brisa_domain::DomainError;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Transport settings for the station telemetry subscription.
#[derive(Debug, Clone)]
pub struct MqttListenerConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    pub client_id: String,
    pub keep_alive: Duration,
    pub reconnect_delay: Duration,
}

/// Subscribes to the station telemetry topic and stages every valid
/// reading.
///
/// Delivery is at-most-once (QoS 0): messages published while the
/// connection is down are lost and never recovered. On any event-loop
/// error the listener tears the session down and reconnects to the same
/// topic after the configured delay, forever, until cancelled.
pub struct MqttListener {
    config: MqttListenerConfig,
    ingestor: Arc<ReadingIngestor>,
}

impl MqttListener {
    pub fn new(config: MqttListenerConfig, ingestor: Arc<ReadingIngestor>) -> Self {
        Self { config, ingestor }
    }

    #[instrument(
        name = "mqtt_listener",
        skip_all,
        fields(broker = %self.config.broker_host, topic = %self.config.topic)
    )]
    pub async fn run(self, ctx: CancellationToken) -> anyhow::Result<()> {
        info!(
            broker_host = %self.config.broker_host,
            broker_port = self.config.broker_port,
            topic = %self.config.topic,
            "starting MQTT listener"
        );

        loop {
            if ctx.is_cancelled() {
                break;
            }

            match self.run_session(&ctx).await {
                Ok(()) => break,
                Err(e) => {
                    error!(error = %e, "MQTT session ended");
                    tokio::select! {
                        _ = ctx.cancelled() => break,
                        _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                    }
                }
            }
        }

        info!("MQTT listener stopped");
        Ok(())
    }

    /// One broker session: connect, subscribe, poll until cancellation or
    /// an event-loop error.
    async fn run_session(&self, ctx: &CancellationToken) -> anyhow::Result<()> {
        let mut options = MqttOptions::new(
            &self.config.client_id,
            &self.config.broker_host,
            self.config.broker_port,
        );
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, 100);

        client
            .subscribe(&self.config.topic, QoS::AtMostOnce)
            .await
            .map_err(|e| anyhow!("failed to subscribe: {e}"))?;

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    debug!("cancellation received, disconnecting");
                    let _ = client.disconnect().await;
                    return Ok(());
                }
                event = eventloop.poll() => {
                    match event {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            info!("connected to MQTT broker");
                        }
                        Ok(Event::Incoming(Packet::SubAck(_))) => {
                            info!(topic = %self.config.topic, "subscribed");
                        }
                        Ok(Event::Incoming(Packet::Publish(publish))) => {
                            self.handle_publish(&publish.payload).await;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            return Err(anyhow!("MQTT event loop error: {e}"));
                        }
                    }
                }
            }
        }
    }

    /// Hand one message to the ingestor. Every failure here is an
    /// observability event, never a listener crash.
    async fn handle_publish(&self, payload: &[u8]) {
        match self.ingestor.ingest(payload).await {
            Ok(staged) => {
                debug!(id = staged.id, station_uid = %staged.station_uid, "message staged");
            }
            Err(DomainError::InvalidReading(reason)) => {
                warn!(reason = %reason, "discarding undecodable message");
            }
            Err(DomainError::StationUnknown(uid)) => {
                warn!(station_uid = %uid, "discarding reading from unregistered station");
            }
            Err(DomainError::StationInactive(uid)) => {
                warn!(station_uid = %uid, "discarding reading from inactive station");
            }
            Err(e) => {
                error!(error = %e, "failed to stage reading");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisa_domain::{
        MockCatalogClient, MockStagedReadingStore, Sensor, StageReadingInput, StagedReading,
        Station, StationStatus,
    };
    use chrono::Utc;

    fn listener_with(catalog: MockCatalogClient, store: MockStagedReadingStore) -> MqttListener {
        let config = MqttListenerConfig {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            topic: "api-fatec/estacao/dados/".to_string(),
            client_id: "test-listener".to_string(),
            keep_alive: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(5),
        };
        let ingestor = Arc::new(ReadingIngestor::new(Arc::new(catalog), Arc::new(store)));
        MqttListener::new(config, ingestor)
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

    #[tokio::test]
    async fn test_valid_message_is_staged() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_station().times(1).return_once(|uid| {
            Ok(Some(Station {
                id: 3,
                uid: uid.to_string(),
                name: "Station One".to_string(),
                status: StationStatus::Active,
                sensors: vec![Sensor {
                    parameter_id: 7,
                    name: "Temperatura".to_string(),
                }],
            }))
        });

        let mut store = MockStagedReadingStore::new();
        store
            .expect_insert_reading()
            .times(1)
            .return_once(|input| Ok(staged(&input)));

        let listener = listener_with(catalog, store);

        listener
            .handle_publish(br#"{"uid": "S1", "unix_time": 1700000000, "temp": 21.5}"#)
            .await;
    }

    #[tokio::test]
    async fn test_unknown_station_message_is_dropped_without_staging() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_station()
            .times(1)
            .return_once(|_| Ok(None));

        let mut store = MockStagedReadingStore::new();
        store.expect_insert_reading().times(0);

        let listener = listener_with(catalog, store);

        listener
            .handle_publish(br#"{"uid": "ghost", "unix_time": 1700000000, "temp": 1.0}"#)
            .await;
    }

    #[tokio::test]
    async fn test_undecodable_message_is_dropped_without_catalog_lookup() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_station().times(0);

        let mut store = MockStagedReadingStore::new();
        store.expect_insert_reading().times(0);

        let listener = listener_with(catalog, store);

        listener.handle_publish(b"\x00\x01 garbage").await;
    }
}
