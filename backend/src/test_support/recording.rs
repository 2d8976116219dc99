//! Recording doubles for outbound side effects.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::NotificationHistory;
use crate::domain::ports::{
    ChatMessenger, ChatMessengerError, NotificationHistorySink, OutgoingMessage, ReplyToken,
};
use crate::domain::weather_evaluation::HistoryRetrySleeper;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("recording mutex"),
    }
}

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0) = now;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Sleeper that returns immediately and remembers each delay.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.0).clone()
    }
}

#[async_trait]
impl HistoryRetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0).push(duration);
    }
}

/// Sink that keeps every submitted record in memory.
#[derive(Default)]
pub struct RecordingHistorySink(Mutex<Vec<NotificationHistory>>);

impl RecordingHistorySink {
    pub fn records(&self) -> Vec<NotificationHistory> {
        lock(&self.0).clone()
    }
}

impl NotificationHistorySink for RecordingHistorySink {
    fn submit(&self, history: NotificationHistory) {
        lock(&self.0).push(history);
    }
}

/// One captured reply call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReply {
    pub reply_token: String,
    pub messages: Vec<OutgoingMessage>,
}

/// Messenger that captures replies instead of sending them.
#[derive(Default)]
pub struct RecordingMessenger {
    replies: Mutex<Vec<RecordedReply>>,
    fail_with: Mutex<Option<ChatMessengerError>>,
}

impl RecordingMessenger {
    pub fn replies(&self) -> Vec<RecordedReply> {
        lock(&self.replies).clone()
    }

    /// Texts of the most recent reply.
    pub fn last_texts(&self) -> Vec<String> {
        lock(&self.replies)
            .last()
            .map(|reply| reply.messages.iter().map(|m| m.text.clone()).collect())
            .unwrap_or_default()
    }

    /// Make every later reply fail with `error`.
    pub fn fail_with(&self, error: ChatMessengerError) {
        *lock(&self.fail_with) = Some(error);
    }
}

#[async_trait]
impl ChatMessenger for RecordingMessenger {
    async fn reply(
        &self,
        reply_token: &ReplyToken,
        messages: &[OutgoingMessage],
    ) -> Result<(), ChatMessengerError> {
        if let Some(error) = lock(&self.fail_with).clone() {
            return Err(error);
        }
        lock(&self.replies).push(RecordedReply {
            reply_token: reply_token.as_str().to_owned(),
            messages: messages.to_vec(),
        });
        Ok(())
    }
}
