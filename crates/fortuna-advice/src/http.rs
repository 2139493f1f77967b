// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of [`AdviceSource`].

use std::time::Duration;

use async_trait::async_trait;
use fortuna_config::model::AdviceConfig;
use fortuna_core::{AdviceSource, FortunaError, QueueItem};
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::SlipResponse;

/// Fetches advice slips with a single GET per call.
///
/// No retries happen here; pacing and backoff belong to the controller.
#[derive(Debug, Clone)]
pub struct HttpAdviceSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpAdviceSource {
    /// Build a source from the advice configuration.
    pub fn new(config: &AdviceConfig) -> Result<Self, FortunaError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| FortunaError::Advice {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            url: config.api_url.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AdviceSource for HttpAdviceSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> Result<QueueItem, FortunaError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                FortunaError::Timeout {
                    duration: self.timeout,
                }
            } else {
                FortunaError::Advice {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })?;

        let status = response.status();
        debug!(status = %status, url = %self.url, "advice response received");
        if !status.is_success() {
            return Err(FortunaError::Advice {
                message: format!("HTTP {status}"),
                source: None,
            });
        }

        let body = response.text().await.map_err(|e| FortunaError::Advice {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        SlipResponse::parse(&body)
    }
}
