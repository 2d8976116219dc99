//! Reply client for the LINE Messaging API.

mod dto;
mod reply_client;

pub use reply_client::LineReplyClient;
