//! NYISO public CSV site over blocking HTTP.
//!
//! One GET per call, no retries. Connection failures and non-2xx statuses are
//! surfaced as transport errors for the caller to handle.

use super::provider::{CsvSource, DataError};
use crate::config::{ClientConfig, ConfigError};
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP source.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl CsvSource for HttpSource {
    fn name(&self) -> &str {
        "nyiso_http"
    }

    fn fetch_text(&self, url: &str) -> Result<String, DataError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send().map_err(|e| DataError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| DataError::Transport {
            url: url.to_string(),
            reason: format!("reading body: {e}"),
        })
    }
}
