//! Application settings loaded via OrthoConfig.
//!
//! Values come from defaults, an optional config file and `WEATHER_BOT_*`
//! environment variables. Accessors apply defaults and validate formats so
//! the bootstrap code only deals with typed values.

use std::net::SocketAddr;
use std::time::Duration;

use chrono_tz::Tz;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";
const DEFAULT_FORECAST_BASE_URL: &str = "https://www.jma.go.jp/bosai/forecast/data/forecast";
const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A value required by the chosen command is absent.
    #[error("missing required setting {name}")]
    Missing { name: &'static str },
    /// A value is present but malformed.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl SettingsError {
    fn invalid(name: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            name,
            message: message.to_string(),
        }
    }
}

/// Configuration for the bot server and the migration command.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WEATHER_BOT")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Channel secret used to verify webhook signatures.
    pub line_channel_secret: Option<String>,
    /// Channel access token used for replies.
    pub line_channel_access_token: Option<String>,
    /// Messaging API base URL.
    pub line_api_base_url: Option<String>,
    /// Forecast document base URL; `{office_id}.json` is appended.
    pub forecast_base_url: Option<String>,
    /// Timeout for outbound HTTP calls, in seconds.
    #[ortho_config(default = 10)]
    pub forecast_timeout_secs: u64,
    /// IANA timezone for forecast dates and batch windows.
    pub timezone: Option<String>,
    /// Users evaluated concurrently during a batch.
    #[ortho_config(default = 4)]
    pub batch_concurrency: usize,
    /// Pending history records held before new ones are dropped.
    #[ortho_config(default = 256)]
    pub history_queue_capacity: usize,
    /// Attempts per history insert, including the first.
    #[ortho_config(default = 3)]
    pub history_max_attempts: u32,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_max_size: u32,
}

fn parse_url(name: &'static str, raw: Option<&str>, default: &str) -> Result<Url, SettingsError> {
    Url::parse(raw.unwrap_or(default)).map_err(|err| SettingsError::invalid(name, err))
}

fn required<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, SettingsError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(SettingsError::Missing { name })
}

impl AppSettings {
    /// Database URL, required by both `serve` and `migrate`.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required("database_url", self.database_url.as_deref())
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| SettingsError::invalid("bind_addr", err))
    }

    /// Webhook signing secret.
    pub fn line_channel_secret(&self) -> Result<&str, SettingsError> {
        required("line_channel_secret", self.line_channel_secret.as_deref())
    }

    /// Reply API bearer token.
    pub fn line_channel_access_token(&self) -> Result<&str, SettingsError> {
        required(
            "line_channel_access_token",
            self.line_channel_access_token.as_deref(),
        )
    }

    /// Messaging API base URL.
    pub fn line_api_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "line_api_base_url",
            self.line_api_base_url.as_deref(),
            DEFAULT_LINE_API_BASE_URL,
        )
    }

    /// Forecast document base URL.
    pub fn forecast_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "forecast_base_url",
            self.forecast_base_url.as_deref(),
            DEFAULT_FORECAST_BASE_URL,
        )
    }

    /// Outbound request timeout, at least one second.
    #[must_use]
    pub fn forecast_timeout(&self) -> Duration {
        Duration::from_secs(self.forecast_timeout_secs.max(1))
    }

    /// Parsed timezone.
    pub fn timezone(&self) -> Result<Tz, SettingsError> {
        self.timezone
            .as_deref()
            .unwrap_or(DEFAULT_TIMEZONE)
            .parse::<Tz>()
            .map_err(|err| SettingsError::invalid("timezone", err))
    }
}
