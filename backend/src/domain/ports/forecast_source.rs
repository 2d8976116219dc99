//! Driven port for fetching per-office forecast documents.
//!
//! The adapter returns the raw body; decoding lives in the domain so the
//! bytes can be archived verbatim in notification history.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while fetching a forecast document.
    pub enum ForecastSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "forecast transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "forecast timeout: {message}",
        /// The upstream rate-limited the request.
        RateLimited { message: String } => "forecast source rate limited request: {message}",
        /// The upstream rejected the request, e.g. unknown office.
        InvalidRequest { message: String } => "forecast request invalid: {message}",
    }
}

/// Port for retrieving forecast documents keyed by office id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch the raw JSON forecast document for `office_id`.
    async fn fetch_forecast(&self, office_id: &str) -> Result<Vec<u8>, ForecastSourceError>;
}

/// Fixture source returning an empty forecast array.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureForecastSource;

#[async_trait]
impl ForecastSource for FixtureForecastSource {
    async fn fetch_forecast(&self, _office_id: &str) -> Result<Vec<u8>, ForecastSourceError> {
        Ok(b"[]".to_vec())
    }
}
