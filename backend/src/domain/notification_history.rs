//! Append-only record of one weather evaluation for one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Audit record written once per evaluation.
///
/// The identifier is assigned before the write so a retried insert stays a
/// single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationHistory {
    pub id: Uuid,
    pub user_id: UserId,
    pub notification_time: DateTime<Utc>,
    pub is_notify_trigger: bool,
    /// Codes in document order, duplicates kept.
    pub weather_codes: Vec<String>,
    /// Raw forecast document as fetched.
    #[serde(skip)]
    pub weather_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl NotificationHistory {
    /// Record an evaluation outcome observed at `now`.
    #[must_use]
    pub fn record(
        user_id: UserId,
        is_notify_trigger: bool,
        weather_codes: Vec<String>,
        weather_data: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            notification_time: now,
            is_notify_trigger,
            weather_codes,
            weather_data,
            created_at: now,
        }
    }
}
