//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AreaQuery, ChatEventHandler, FixtureAreaQuery, FixtureChatEventHandler,
    FixtureUserAdministration, FixtureWeatherBatchCommand, UserAdministration,
    WeatherBatchCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub areas: Arc<dyn AreaQuery>,
    pub chat_events: Arc<dyn ChatEventHandler>,
    pub weather_batch: Arc<dyn WeatherBatchCommand>,
    pub users: Arc<dyn UserAdministration>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            areas: Arc::new(FixtureAreaQuery),
            chat_events: Arc::new(FixtureChatEventHandler),
            weather_batch: Arc::new(FixtureWeatherBatchCommand),
            users: Arc::new(FixtureUserAdministration),
        }
    }
}

/// Secret shared with the chat platform for webhook signatures.
#[derive(Clone)]
pub struct ChannelSecret(Arc<str>);

impl ChannelSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for ChannelSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChannelSecret(..)")
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub areas: Arc<dyn AreaQuery>,
    pub chat_events: Arc<dyn ChatEventHandler>,
    pub weather_batch: Arc<dyn WeatherBatchCommand>,
    pub users: Arc<dyn UserAdministration>,
    pub channel_secret: ChannelSecret,
}

impl HttpState {
    /// Construct state from a ports bundle and the webhook secret.
    ///
    /// # Examples
    /// ```
    /// use weather_bot::inbound::http::state::{ChannelSecret, HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default(), ChannelSecret::new("secret"));
    /// let _batch = state.weather_batch.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, channel_secret: ChannelSecret) -> Self {
        let HttpStatePorts {
            areas,
            chat_events,
            weather_batch,
            users,
        } = ports;
        Self {
            areas,
            chat_events,
            weather_batch,
            users,
            channel_secret,
        }
    }
}
