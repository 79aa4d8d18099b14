//! IBGE HTTP client

use crate::payload::parse_municipalities;
use crate::{FetchError, MunicipalitySource, DEFAULT_TIMEOUT_SECS, IBGE_MUNICIPALITIES_URL};
use async_trait::async_trait;
use std::time::Duration;
use storage::Municipality;
use tracing::{debug, info, warn};

/// Client for the IBGE localities API
#[derive(Debug, Clone)]
pub struct IbgeClient {
    client: reqwest::Client,
    /// Endpoint returning the municipality array
    url: String,
}

impl IbgeClient {
    /// Create a client for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into();
        info!("Creating upstream client for {}", url);

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// Client for the default IBGE endpoint
    pub fn ibge() -> Result<Self, FetchError> {
        Self::new(
            IBGE_MUNICIPALITIES_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Endpoint this client fetches from
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MunicipalitySource for IbgeClient {
    async fn fetch(&self) -> Result<Vec<Municipality>, FetchError> {
        debug!(url = %self.url, "Fetching municipalities");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Upstream returned non-success status");
            return Err(FetchError::UpstreamUnavailable {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let records = parse_municipalities(&body)?;
        info!(count = records.len(), "Fetched municipalities from upstream");
        Ok(records)
    }
}
