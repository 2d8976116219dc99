//! Driven ports for recording notification history.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::NotificationHistory;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification history adapters.
    pub enum NotificationHistoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification history connection failed: {message}",
        /// Insert failed during execution.
        Query { message: String } => "notification history insert failed: {message}",
    }
}

impl NotificationHistoryRepositoryError {
    /// Whether retrying the insert may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Append-only history store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationHistoryRepository: Send + Sync {
    /// Append one record and return its identifier.
    ///
    /// Inserting a record whose id already exists is a no-op.
    async fn insert(
        &self,
        history: &NotificationHistory,
    ) -> Result<Uuid, NotificationHistoryRepositoryError>;
}

/// Fire-and-forget hand-off for history records.
///
/// Implementations must not block the caller and must log their own
/// failures.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationHistorySink: Send + Sync {
    /// Submit a record for durable storage.
    fn submit(&self, history: NotificationHistory);
}

/// Fixture sink that drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNotificationHistorySink;

impl NotificationHistorySink for FixtureNotificationHistorySink {
    fn submit(&self, _history: NotificationHistory) {}
}
