//! Driving port for administrative user management.

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{ChatUserId, Error, NotifyTime, User, UserId};

/// Payload for registering a user outside the chat flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    pub chat_user_id: ChatUserId,
    #[serde(default)]
    pub selected_area_id: Option<String>,
    #[serde(default)]
    pub notify_time: Option<NotifyTime>,
}

/// Partial update guarded by the caller's last seen revision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub selected_area_id: Option<String>,
    #[serde(default)]
    pub notify_time: Option<NotifyTime>,
    #[serde(default)]
    pub is_active: Option<bool>,
    pub revision: u32,
}

/// Use-case port for the user administration API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Register a user; duplicate chat ids are `conflict`.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error>;

    /// Fetch by internal id.
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;

    /// Fetch by chat platform id.
    async fn get_user_by_chat_id(&self, chat_user_id: &ChatUserId) -> Result<User, Error>;

    /// Apply `request`; a stale revision is `conflict`.
    async fn update_user(&self, id: &UserId, request: UpdateUserRequest) -> Result<User, Error>;

    /// Delete a user.
    async fn delete_user(&self, id: &UserId) -> Result<(), Error>;
}

/// Fixture that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserAdministration;

#[async_trait]
impl UserAdministration for FixtureUserAdministration {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let mut user = User::new_follower(request.chat_user_id, chrono::Utc::now());
        user.selected_area_id = request.selected_area_id;
        user.notify_time = request.notify_time;
        Ok(user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        Err(Error::not_found(format!("user {id} not found")))
    }

    async fn get_user_by_chat_id(&self, chat_user_id: &ChatUserId) -> Result<User, Error> {
        Err(Error::not_found(format!("chat user {chat_user_id} not found")))
    }

    async fn update_user(&self, id: &UserId, _request: UpdateUserRequest) -> Result<User, Error> {
        Err(Error::not_found(format!("user {id} not found")))
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        Err(Error::not_found(format!("user {id} not found")))
    }
}
