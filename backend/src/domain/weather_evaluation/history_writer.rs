//! Bounded, supervised queue for notification history writes.
//!
//! Evaluation hands records to [`QueuedHistoryWriter::submit`], which never
//! blocks. A single worker task drains the queue and retries retryable
//! insert failures with capped exponential backoff. Records carry their id
//! from creation, so a retried insert cannot produce a second row.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::NotificationHistory;
use crate::domain::ports::{NotificationHistoryRepository, NotificationHistorySink};

/// Queue and retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWriterConfig {
    /// Records buffered before new submissions are dropped.
    pub capacity: usize,
    /// Insert attempts per record, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for HistoryWriterConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Async sleep used between retries.
#[async_trait]
pub trait HistoryRetrySleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl HistoryRetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sending half of the history queue.
///
/// The worker stops once every clone of the writer is dropped and the queue
/// is drained.
#[derive(Clone)]
pub struct QueuedHistoryWriter {
    sender: Sender<NotificationHistory>,
}

impl QueuedHistoryWriter {
    /// Spawn the worker on the current Tokio runtime.
    pub fn spawn(
        repository: Arc<dyn NotificationHistoryRepository>,
        config: HistoryWriterConfig,
    ) -> (Self, JoinHandle<()>) {
        Self::spawn_with_sleeper(repository, Arc::new(TokioSleeper), config)
    }

    /// Spawn the worker with an injected sleeper.
    pub fn spawn_with_sleeper(
        repository: Arc<dyn NotificationHistoryRepository>,
        sleeper: Arc<dyn HistoryRetrySleeper>,
        config: HistoryWriterConfig,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let worker = HistoryWorker {
            repository,
            sleeper,
            config,
        };
        let handle = tokio::spawn(worker.run(receiver));
        (Self { sender }, handle)
    }
}

impl NotificationHistorySink for QueuedHistoryWriter {
    fn submit(&self, history: NotificationHistory) {
        match self.sender.try_send(history) {
            Ok(()) => {}
            Err(TrySendError::Full(history)) => error!(
                history_id = %history.id,
                user_id = %history.user_id,
                "notification history queue full; record dropped"
            ),
            Err(TrySendError::Closed(history)) => error!(
                history_id = %history.id,
                user_id = %history.user_id,
                "notification history writer stopped; record dropped"
            ),
        }
    }
}

struct HistoryWorker {
    repository: Arc<dyn NotificationHistoryRepository>,
    sleeper: Arc<dyn HistoryRetrySleeper>,
    config: HistoryWriterConfig,
}

impl HistoryWorker {
    async fn run(self, mut receiver: Receiver<NotificationHistory>) {
        while let Some(record) = receiver.recv().await {
            self.write(&record).await;
        }
        debug!("notification history queue closed");
    }

    async fn write(&self, record: &NotificationHistory) {
        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.repository.insert(record).await {
                Ok(_) => return,
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(history_id = %record.id, attempt, error = %err, "history insert failed; retrying");
                    self.sleeper.sleep(self.retry_base_delay(attempt)).await;
                }
                Err(err) => {
                    error!(
                        history_id = %record.id,
                        user_id = %record.user_id,
                        attempts = attempt,
                        error = %err,
                        "notification history write failed"
                    );
                    return;
                }
            }
        }
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}
