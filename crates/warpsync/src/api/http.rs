use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::fetch::{FetchedPage, PageFetcher};
use crate::error::{Error, Result};

/// Blocking fetcher backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl PageFetcher for UreqFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let mut response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|e| Error::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = match response.body_mut().read_json::<Value>() {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Failed to decode response body (status {}): {}", status, e);
                None
            }
        };

        Ok(FetchedPage { status, body })
    }
}
