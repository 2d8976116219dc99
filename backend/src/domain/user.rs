//! Bot user aggregate and conversation status.
//!
//! A [`User`] is created on the first follow event, walked through area
//! registration by the conversation service, and afterwards edited through
//! the administration API. Every persisted mutation bumps `revision`, which
//! storage adapters use for conditional updates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors for user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("chat user id must not be empty")]
    EmptyChatUserId,
    #[error("notify time must use HH:MM, got {0:?}")]
    InvalidNotifyTime(String),
    #[error("unknown conversation status {0:?}")]
    UnknownStatus(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = Uuid)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier assigned to the user by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "U4af4980629")]
pub struct ChatUserId(String);

impl ChatUserId {
    /// Validate a platform user id.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyChatUserId);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ChatUserId> for String {
    fn from(value: ChatUserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ChatUserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Time of day at which the user wants a forecast check, serialised `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "08:00")]
pub struct NotifyTime(NaiveTime);

impl NotifyTime {
    const FORMAT: &'static str = "%H:%M";

    /// Wrap a time of day, truncated to the minute.
    #[must_use]
    pub fn new(time: NaiveTime) -> Self {
        use chrono::Timelike;
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }

    /// Access the wrapped time.
    #[must_use]
    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for NotifyTime {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidNotifyTime(s.to_owned()))
    }
}

impl fmt::Display for NotifyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl From<NotifyTime> for String {
    fn from(value: NotifyTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for NotifyTime {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Position of a user within the area registration conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    AwaitingPrefecture,
    AwaitingMunicipality,
    AwaitingConfirmation,
    AwaitingAreaClass10Selection,
    AwaitingAreaClass15Selection,
    AwaitingAreaClass20Selection,
    Completed,
}

impl ConversationStatus {
    /// Every status, in flow order.
    pub const ALL: [Self; 7] = [
        Self::AwaitingPrefecture,
        Self::AwaitingMunicipality,
        Self::AwaitingConfirmation,
        Self::AwaitingAreaClass10Selection,
        Self::AwaitingAreaClass15Selection,
        Self::AwaitingAreaClass20Selection,
        Self::Completed,
    ];

    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPrefecture => "awaiting_prefecture",
            Self::AwaitingMunicipality => "awaiting_municipality",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::AwaitingAreaClass10Selection => "awaiting_area_class10_selection",
            Self::AwaitingAreaClass15Selection => "awaiting_area_class15_selection",
            Self::AwaitingAreaClass20Selection => "awaiting_area_class20_selection",
            Self::Completed => "completed",
        }
    }

    /// Whether a conversation may move from `self` to `next`.
    ///
    /// Staying put is always allowed. The only backward edge is
    /// class10 selection back to the prefecture prompt.
    #[must_use]
    pub fn allows(self, next: Self) -> bool {
        use ConversationStatus as S;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (S::AwaitingPrefecture, S::AwaitingMunicipality)
                | (S::AwaitingMunicipality, S::AwaitingConfirmation)
                | (S::AwaitingConfirmation, S::Completed)
                | (S::AwaitingConfirmation, S::AwaitingAreaClass10Selection)
                | (S::AwaitingAreaClass10Selection, S::AwaitingAreaClass15Selection)
                | (S::AwaitingAreaClass10Selection, S::AwaitingPrefecture)
                | (S::AwaitingAreaClass15Selection, S::AwaitingAreaClass20Selection)
                | (S::AwaitingAreaClass20Selection, S::Completed)
        )
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UserValidationError::UnknownStatus(s.to_owned()))
    }
}

/// Rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conversation cannot move from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: ConversationStatus,
    pub to: ConversationStatus,
}

/// Bot user aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub chat_user_id: ChatUserId,
    pub selected_area_office_id: Option<String>,
    pub selected_area_class15_id: Option<String>,
    /// Selected class20 leaf.
    pub selected_area_id: Option<String>,
    pub notify_time: Option<NotifyTime>,
    pub is_active: bool,
    pub status: ConversationStatus,
    /// Optimistic concurrency counter; starts at 1.
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly followed user, waiting for a prefecture name.
    #[must_use]
    pub fn new_follower(chat_user_id: ChatUserId, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::random(),
            chat_user_id,
            selected_area_office_id: None,
            selected_area_class15_id: None,
            selected_area_id: None,
            notify_time: None,
            is_active: true,
            status: ConversationStatus::AwaitingPrefecture,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the conversation to `next` if the transition table permits it.
    pub fn advance(&mut self, next: ConversationStatus) -> Result<(), StatusTransitionError> {
        if !self.status.allows(next) {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
