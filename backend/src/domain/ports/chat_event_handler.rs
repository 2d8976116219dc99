//! Driving port for chat platform events.
//!
//! The webhook adapter verifies and decodes platform payloads, then hands
//! each supported event to this port in arrival order.

use async_trait::async_trait;

use crate::domain::{ChatUserId, Error};

use super::ReplyToken;

/// Inbound chat event understood by the conversation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The user added the bot.
    Followed {
        chat_user_id: ChatUserId,
        reply_token: ReplyToken,
    },
    /// The user sent a text message.
    TextReceived {
        chat_user_id: ChatUserId,
        reply_token: ReplyToken,
        text: String,
    },
}

impl ChatEvent {
    /// Sender of the event.
    #[must_use]
    pub fn chat_user_id(&self) -> &ChatUserId {
        match self {
            Self::Followed { chat_user_id, .. } | Self::TextReceived { chat_user_id, .. } => {
                chat_user_id
            }
        }
    }
}

/// Use-case port driving the registration conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatEventHandler: Send + Sync {
    /// Apply one event. Lookup misses are answered in-chat and return `Ok`;
    /// only persistence failures surface as errors.
    async fn handle(&self, event: ChatEvent) -> Result<(), Error>;
}

/// Fixture handler that accepts and ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChatEventHandler;

#[async_trait]
impl ChatEventHandler for FixtureChatEventHandler {
    async fn handle(&self, _event: ChatEvent) -> Result<(), Error> {
        Ok(())
    }
}
