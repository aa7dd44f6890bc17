use crate::models::{ParameterDto, StationDto};
use async_trait::async_trait;
use brisa_domain::{CatalogClient, DomainError, DomainResult, Parameter, Station};
use reqwest::StatusCode;
use tracing::{debug, instrument};

/// `CatalogClient` backed by the downstream REST API.
///
/// Single attempt per call: a 404 maps to `Ok(None)`, every other failure
/// to `CatalogUnavailable` so callers can treat the record as not yet
/// resolvable and try again on a later pass.
#[derive(Clone)]
pub struct RestCatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl RestCatalogClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get(&self, url: &str) -> DomainResult<reqwest::Response> {
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for RestCatalogClient {
    #[instrument(skip(self))]
    async fn fetch_station(&self, uid: &str) -> DomainResult<Option<Station>> {
        let url = format!("{}/estacoes/uid/{}", self.base_url, uid);
        let response = self.get(&url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let dto: StationDto = response
                    .json()
                    .await
                    .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))?;
                Ok(Some(dto.into()))
            }
            status => Err(DomainError::CatalogUnavailable(format!(
                "GET {url} returned {status}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_parameter(&self, id: i64) -> DomainResult<Option<Parameter>> {
        let url = format!("{}/parametros/{}", self.base_url, id);
        let response = self.get(&url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let dto: ParameterDto = response
                    .json()
                    .await
                    .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))?;
                Ok(Some(dto.into()))
            }
            status => Err(DomainError::CatalogUnavailable(format!(
                "GET {url} returned {status}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn list_parameters(&self) -> DomainResult<Vec<Parameter>> {
        let url = format!("{}/parametros/", self.base_url);
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            return Err(DomainError::CatalogUnavailable(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }

        let dtos: Vec<ParameterDto> = response
            .json()
            .await
            .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))?;

        debug!(count = dtos.len(), "parameter catalog fetched");
        Ok(dtos.into_iter().map(Parameter::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_active_stations(&self) -> DomainResult<Vec<Station>> {
        let url = format!("{}/estacoes/", self.base_url);
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            return Err(DomainError::CatalogUnavailable(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }

        let dtos: Vec<StationDto> = response
            .json()
            .await
            .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))?;

        let stations: Vec<Station> = dtos
            .into_iter()
            .map(Station::from)
            .filter(Station::is_active)
            .collect();

        debug!(count = stations.len(), "active stations fetched");
        Ok(stations)
    }
}
