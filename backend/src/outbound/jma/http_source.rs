//! Reqwest-backed forecast source adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping. The body is handed back untouched so the domain can
//! decode it and archive the exact bytes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{ForecastSource, ForecastSourceError};
use crate::outbound::body_preview::body_preview;

const DEFAULT_USER_AGENT: &str = "weather-bot/0.1";

/// Forecast source fetching `{base}/{office_id}.json`.
pub struct JmaForecastSource {
    client: Client,
    base_url: Url,
}

impl JmaForecastSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn document_url(&self, office_id: &str) -> Result<Url, ForecastSourceError> {
        if office_id.is_empty() || !office_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ForecastSourceError::invalid_request(format!(
                "office id must be numeric, got {office_id:?}"
            )));
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{office_id}.json")).map_err(|err| {
            ForecastSourceError::invalid_request(format!("invalid forecast url: {err}"))
        })
    }
}

#[async_trait]
impl ForecastSource for JmaForecastSource {
    async fn fetch_forecast(&self, office_id: &str) -> Result<Vec<u8>, ForecastSourceError> {
        let url = self.document_url(office_id)?;
        debug!(%url, "fetching forecast document");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn map_transport_error(error: reqwest::Error) -> ForecastSourceError {
    if error.is_timeout() {
        ForecastSourceError::timeout(error.to_string())
    } else {
        ForecastSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ForecastSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => ForecastSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ForecastSourceError::timeout(message)
        }
        _ if status.is_client_error() => ForecastSourceError::invalid_request(message),
        _ => ForecastSourceError::transport(message),
    }
}
