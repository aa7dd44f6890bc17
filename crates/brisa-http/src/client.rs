use anyhow::Result;
use std::time::Duration;

/// Settings for the shared downstream HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Build the reqwest client shared by the catalog client and the forwarder.
///
/// Both timeouts are bounded so a hung downstream cannot stall a
/// reconciliation pass indefinitely.
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()?)
}
