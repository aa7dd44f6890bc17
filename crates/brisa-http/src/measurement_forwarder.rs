use crate::models::MeasurementDto;
use async_trait::async_trait;
use brisa_domain::{DomainError, DomainResult, Measurement, MeasurementForwarder};
use tracing::{debug, instrument};

/// `MeasurementForwarder` backed by `POST /medidas/` on the downstream API.
///
/// One request per measurement; 200 and 201 count as delivered, everything
/// else is a failed attempt for the caller's accounting. No retries here.
#[derive(Clone)]
pub struct RestMeasurementForwarder {
    base_url: String,
    http: reqwest::Client,
}

impl RestMeasurementForwarder {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait]
impl MeasurementForwarder for RestMeasurementForwarder {
    #[instrument(
        skip(self, measurement),
        fields(
            station_id = measurement.station_id,
            parameter_id = measurement.parameter_id
        )
    )]
    async fn forward(&self, measurement: &Measurement) -> DomainResult<()> {
        let url = format!("{}/medidas/", self.base_url);
        let body = MeasurementDto::from(measurement);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::MeasurementRejected(e.to_string()))?;

        match response.status().as_u16() {
            200 | 201 => {
                debug!("measurement accepted");
                Ok(())
            }
            status => Err(DomainError::MeasurementRejected(format!(
                "POST {url} returned {status}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisa_domain::unix_to_event_time;
    use serde_json::json;

    fn measurement() -> Measurement {
        Measurement {
            station_id: 3,
            parameter_id: 7,
            value: 21.5,
            measured_at: unix_to_event_time(1_700_000_000),
        }
    }

    #[tokio::test]
    async fn test_forward_sends_expected_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/medidas/")
            .match_body(mockito::Matcher::Json(json!({
                "estacao_id": 3,
                "parametro_id": 7,
                "valor": 21.5,
                "data_hora": "2023-11-14T22:13:20"
            })))
            .with_status(201)
            .create_async()
            .await;

        let forwarder = RestMeasurementForwarder::new(server.url(), reqwest::Client::new());

        forwarder.forward(&measurement()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forward_accepts_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/medidas/")
            .with_status(200)
            .create_async()
            .await;

        let forwarder = RestMeasurementForwarder::new(server.url(), reqwest::Client::new());

        assert!(forwarder.forward(&measurement()).await.is_ok());
    }

    #[tokio::test]
    async fn test_forward_rejects_other_statuses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/medidas/")
            .with_status(422)
            .create_async()
            .await;

        let forwarder = RestMeasurementForwarder::new(server.url(), reqwest::Client::new());

        let result = forwarder.forward(&measurement()).await;

        assert!(matches!(result, Err(DomainError::MeasurementRejected(_))));
    }

    #[tokio::test]
    async fn test_forward_unreachable_downstream_is_rejected() {
        let forwarder =
            RestMeasurementForwarder::new("http://127.0.0.1:1", reqwest::Client::new());

        let result = forwarder.forward(&measurement()).await;

        assert!(matches!(result, Err(DomainError::MeasurementRejected(_))));
    }
}
