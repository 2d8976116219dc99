//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;
use weather_bot::domain::{HistoryWriterConfig, WeatherEvaluationConfig};
use weather_bot::inbound::http::state::ChannelSecret;
use weather_bot::outbound::persistence::DbPool;

/// Endpoints and credentials for the forecast and chat adapters.
#[derive(Debug, Clone)]
pub struct OutboundConfig {
    pub(crate) forecast_base_url: Url,
    pub(crate) line_api_base_url: Url,
    pub(crate) line_access_token: String,
    pub(crate) timeout: Duration,
}

impl OutboundConfig {
    /// Bundle outbound adapter settings.
    #[must_use]
    pub fn new(
        forecast_base_url: Url,
        line_api_base_url: Url,
        line_access_token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            forecast_base_url,
            line_api_base_url,
            line_access_token: line_access_token.into(),
            timeout,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) channel_secret: ChannelSecret,
    pub(crate) outbound: OutboundConfig,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) evaluation: WeatherEvaluationConfig,
    pub(crate) history: HistoryWriterConfig,
}

impl ServerConfig {
    /// Construct a server configuration with default batch tuning.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, channel_secret: ChannelSecret, outbound: OutboundConfig) -> Self {
        Self {
            bind_addr,
            channel_secret,
            outbound,
            db_pool: None,
            evaluation: WeatherEvaluationConfig::default(),
            history: HistoryWriterConfig::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool the server runs on fixture ports, which is only
    /// useful for smoke tests.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override batch concurrency and timezone.
    #[must_use]
    pub fn with_evaluation(mut self, evaluation: WeatherEvaluationConfig) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Override history queue capacity and retry policy.
    #[must_use]
    pub fn with_history_writer(mut self, history: HistoryWriterConfig) -> Self {
        self.history = history;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
