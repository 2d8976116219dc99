//! Wire shapes for the reply endpoint.
//!
//! Limits enforced here mirror the platform's: at most five messages per
//! reply, thirteen quick-reply items per message and twenty characters per
//! button label.

use serde::Serialize;

use crate::domain::ports::{MAX_QUICK_REPLIES, OutgoingMessage, QuickReplyOption};

pub(super) const MAX_MESSAGES_PER_REPLY: usize = 5;
const MAX_LABEL_CHARS: usize = 20;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReplyRequestDto<'a> {
    pub reply_token: &'a str,
    pub messages: Vec<TextMessageDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TextMessageDto<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReplyDto<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct QuickReplyDto<'a> {
    pub items: Vec<QuickReplyItemDto<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct QuickReplyItemDto<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: MessageActionDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageActionDto<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: String,
    pub text: &'a str,
}

fn truncate_label(label: &str) -> String {
    label.chars().take(MAX_LABEL_CHARS).collect()
}

impl<'a> From<&'a QuickReplyOption> for QuickReplyItemDto<'a> {
    fn from(option: &'a QuickReplyOption) -> Self {
        Self {
            kind: "action",
            action: MessageActionDto {
                kind: "message",
                label: truncate_label(&option.label),
                text: &option.value,
            },
        }
    }
}

impl<'a> From<&'a OutgoingMessage> for TextMessageDto<'a> {
    fn from(message: &'a OutgoingMessage) -> Self {
        let quick_reply = (!message.quick_replies.is_empty()).then(|| QuickReplyDto {
            items: message
                .quick_replies
                .iter()
                .take(MAX_QUICK_REPLIES)
                .map(QuickReplyItemDto::from)
                .collect(),
        });
        Self {
            kind: "text",
            text: &message.text,
            quick_reply,
        }
    }
}

impl<'a> ReplyRequestDto<'a> {
    pub(super) fn new(reply_token: &'a str, messages: &'a [OutgoingMessage]) -> Self {
        Self {
            reply_token,
            messages: messages
                .iter()
                .take(MAX_MESSAGES_PER_REPLY)
                .map(TextMessageDto::from)
                .collect(),
        }
    }
}
