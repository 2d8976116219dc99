//! PostgreSQL-backed `NotificationHistoryRepository`.
//!
//! The table is append-only. Inserts use `ON CONFLICT (id) DO NOTHING` so a
//! retried write of the same record stays a single row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::NotificationHistory;
use crate::domain::ports::{NotificationHistoryRepository, NotificationHistoryRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewNotificationHistoryRow;
use super::pool::{DbPool, PoolError};
use super::schema::notification_history;

/// Diesel-backed implementation of the `NotificationHistoryRepository` port.
#[derive(Clone)]
pub struct DieselNotificationHistoryRepository {
    pool: DbPool,
}

impl DieselNotificationHistoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationHistoryRepositoryError {
    map_basic_pool_error(error, NotificationHistoryRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationHistoryRepositoryError {
    map_basic_diesel_error(
        error,
        NotificationHistoryRepositoryError::query,
        NotificationHistoryRepositoryError::connection,
    )
}

fn to_row(history: &NotificationHistory) -> NewNotificationHistoryRow<'_> {
    NewNotificationHistoryRow {
        id: history.id,
        user_id: *history.user_id.as_uuid(),
        notification_time: history.notification_time,
        is_notify_trigger: history.is_notify_trigger,
        weather_codes: &history.weather_codes,
        weather_data: &history.weather_data,
        created_at: history.created_at,
    }
}

#[async_trait]
impl NotificationHistoryRepository for DieselNotificationHistoryRepository {
    async fn insert(
        &self,
        history: &NotificationHistory,
    ) -> Result<Uuid, NotificationHistoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = diesel::insert_into(notification_history::table)
            .values(&to_row(history))
            .on_conflict(notification_history::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if inserted == 0 {
            debug!(history_id = %history.id, "history record already stored");
        }
        Ok(history.id)
    }
}
