//! Reqwest-backed `ChatMessenger` posting to `/v2/bot/message/reply`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::dto::{MAX_MESSAGES_PER_REPLY, ReplyRequestDto};
use crate::domain::ports::{ChatMessenger, ChatMessengerError, OutgoingMessage, ReplyToken};
use crate::outbound::body_preview::body_preview;

const REPLY_PATH: &str = "v2/bot/message/reply";

/// Reply client authenticated with a channel access token.
pub struct LineReplyClient {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl LineReplyClient {
    /// Build a client against `api_base`, e.g. `https://api.line.me`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatMessengerError::Transport`] when the base URL cannot be
    /// joined or the reqwest client cannot be constructed.
    pub fn new(
        api_base: &Url,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatMessengerError> {
        let endpoint = reply_endpoint(api_base)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChatMessengerError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.into(),
        })
    }
}

fn reply_endpoint(api_base: &Url) -> Result<Url, ChatMessengerError> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REPLY_PATH)
        .map_err(|err| ChatMessengerError::transport(format!("invalid reply endpoint: {err}")))
}

#[async_trait]
impl ChatMessenger for LineReplyClient {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: &[OutgoingMessage],
    ) -> Result<(), ChatMessengerError> {
        if messages.is_empty() {
            return Ok(());
        }
        if messages.len() > MAX_MESSAGES_PER_REPLY {
            warn!(
                count = messages.len(),
                "reply exceeds the per-request message limit; extra messages dropped"
            );
        }

        let payload = ReplyRequestDto::new(reply_token.as_str(), messages);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ChatMessengerError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(messages = payload.messages.len(), "reply delivered");
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(ChatMessengerError::rejected(status.as_u16(), body_preview(&body)))
    }
}
