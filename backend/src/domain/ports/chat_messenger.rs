//! Driven port for replying to chat platform events.

use async_trait::async_trait;

use super::define_port_error;

/// Most quick-reply options the platform accepts on one message.
pub const MAX_QUICK_REPLIES: usize = 13;

/// Single-use token authorising a reply to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyToken(String);

impl ReplyToken {
    /// Wrap a platform reply token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Selectable option attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyOption {
    /// Text shown on the button.
    pub label: String,
    /// Text sent back when the button is tapped.
    pub value: String,
}

impl QuickReplyOption {
    /// Option whose label and value differ.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Option sending back its own label.
    pub fn echo(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            value: text,
        }
    }
}

/// One outbound text message with optional quick replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub quick_replies: Vec<QuickReplyOption>,
}

impl OutgoingMessage {
    /// Plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    /// Text message offering `options`.
    pub fn with_options(text: impl Into<String>, options: Vec<QuickReplyOption>) -> Self {
        Self {
            text: text.into(),
            quick_replies: options,
        }
    }
}

define_port_error! {
    /// Errors raised while sending replies.
    pub enum ChatMessengerError {
        /// Network transport failed.
        Transport { message: String } => "chat reply transport failed: {message}",
        /// The platform rejected the reply.
        Rejected { status: u16, message: String } => "chat platform rejected reply ({status}): {message}",
    }
}

/// Port for sending replies on the chat platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatMessenger: Send + Sync {
    /// Reply to one inbound event with up to five messages.
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: &[OutgoingMessage],
    ) -> Result<(), ChatMessengerError>;
}

/// Fixture messenger that discards replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureChatMessenger;

#[async_trait]
impl ChatMessenger for FixtureChatMessenger {
    async fn reply(
        &self,
        _reply_token: &ReplyToken,
        _messages: &[OutgoingMessage],
    ) -> Result<(), ChatMessengerError> {
        Ok(())
    }
}
