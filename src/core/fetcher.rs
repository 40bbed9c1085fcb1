//! Usage API fetcher.
//!
//! Sends one POST to the campus usage endpoint, decodes the reading, and
//! classifies the remaining quota.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::http::{self, DEFAULT_TIMEOUT};
use super::models::{NotificationMessage, UsageRequest, UsageResponse};
use crate::error::{AlertError, Result};
use crate::storage::RequestConfig;

const SERVICE: &str = "usage API";

/// Fetches and classifies the current usage reading.
#[derive(Debug, Clone)]
pub struct UsageFetcher {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
    body: UsageRequest,
    timeout: Duration,
}

impl UsageFetcher {
    /// Build a fetcher from the `RequestData` config section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for a header that is not valid HTTP, or a
    /// network error if the client cannot be built.
    pub fn new(config: &RequestConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Build a fetcher with a custom per-attempt timeout.
    ///
    /// # Errors
    ///
    /// See [`UsageFetcher::new`].
    pub fn with_timeout(config: &RequestConfig, timeout: Duration) -> Result<Self> {
        let client = if config.insecure_tls {
            http::build_legacy_tls_client(timeout)?
        } else {
            http::build_client(timeout)?
        };

        Ok(Self {
            client,
            endpoint: config.api.clone(),
            headers: build_headers(config)?,
            body: request_body(config),
            timeout,
        })
    }

    /// Perform one attempt against the usage API.
    ///
    /// # Errors
    ///
    /// Returns a fetch-category error on transport failure, timeout, non-2xx
    /// status, or a body that does not decode.
    pub async fn fetch(&self) -> Result<NotificationMessage> {
        tracing::debug!(endpoint = %self.endpoint, "Requesting usage");

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&self.body)
            .send()
            .await
            .map_err(|e| AlertError::from_transport(&e, self.timeout.as_secs()))?;

        let response = http::ensure_success(response, SERVICE).await?;

        let payload: UsageResponse = response
            .json()
            .await
            .map_err(|e| AlertError::ParseResponse(e.to_string()))?;

        if !payload.rel {
            tracing::debug!(
                status = payload.status,
                "Usage API reported rel=false; classifying the reading anyway"
            );
        }

        let message = payload.data.to_message();
        tracing::info!(
            used_amp = payload.data.used_amp,
            all_amp = payload.data.all_amp,
            remaining = message.remaining,
            classification = %message.classification,
            "Usage fetched"
        );
        Ok(message)
    }
}

fn request_body(config: &RequestConfig) -> UsageRequest {
    UsageRequest {
        text: config.text.clone(),
        campus: config.campus.clone(),
        source: config.source.clone(),
        id: config.id,
        build: config.build.clone(),
        room: config.room.clone(),
        room_id: config.room_id.clone(),
        lang: config.lang.clone(),
        terminal: config.terminal.clone(),
    }
}

fn build_headers(config: &RequestConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());
    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| AlertError::ConfigInvalid {
            key: format!("RequestData.Headers.{key}"),
            message: e.to_string(),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| AlertError::ConfigInvalid {
            key: format!("RequestData.Headers.{key}"),
            message: e.to_string(),
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}
