//! Administrative user management behind the [`UserAdministration`] port.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{
    CreateUserRequest, UpdateUserRequest, UserAdministration, UserPersistenceError,
    UserRepository,
};
use super::{
    AreaHierarchyService, AreaLookupError, ChatUserId, ConversationStatus, Error, User, UserId,
};

/// Failures raised by [`UserService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserServiceError {
    #[error("user {id} not found")]
    NotFound { id: String },
    #[error("selected area is invalid: {0}")]
    Area(#[from] AreaLookupError),
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
}

impl From<UserServiceError> for Error {
    fn from(value: UserServiceError) -> Self {
        match value {
            UserServiceError::NotFound { .. } => Error::not_found(value.to_string()),
            UserServiceError::Area(AreaLookupError::Repository(err)) => {
                Error::from(AreaLookupError::Repository(err))
            }
            UserServiceError::Area(_) => Error::invalid_request(value.to_string()),
            UserServiceError::Persistence(err) => match err {
                UserPersistenceError::DuplicateChatUser { .. }
                | UserPersistenceError::RevisionMismatch { .. } => Error::conflict(err.to_string()),
                UserPersistenceError::NotFound { .. } => Error::not_found(err.to_string()),
                UserPersistenceError::Connection { .. } => {
                    Error::service_unavailable("user store unavailable")
                }
                UserPersistenceError::Query { .. } => Error::internal(err.to_string()),
            },
        }
    }
}

/// User CRUD with area validation.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    areas: AreaHierarchyService,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        areas: AreaHierarchyService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            areas,
            clock,
        }
    }

    /// Validate `class20_id` and copy its chain onto `user`.
    async fn select_area(&self, user: &mut User, class20_id: &str) -> Result<(), UserServiceError> {
        let hierarchy = self.areas.resolve_by_leaf_id(class20_id).await?;
        user.selected_area_office_id = Some(hierarchy.office.id);
        user.selected_area_class15_id = Some(hierarchy.class15.id);
        user.selected_area_id = Some(hierarchy.class20.id);
        Ok(())
    }

    /// Register a user. Users created with an area skip the chat flow.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let mut user = User::new_follower(request.chat_user_id, self.clock.utc());
        user.notify_time = request.notify_time;
        if let Some(area) = request.selected_area_id.as_deref() {
            self.select_area(&mut user, area).await?;
            user.status = ConversationStatus::Completed;
        }
        self.users.create(&user).await?;
        info!(user_id = %user.id, "user created via administration api");
        Ok(user)
    }

    pub async fn get(&self, id: &UserId) -> Result<User, UserServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound { id: id.to_string() })
    }

    pub async fn get_by_chat_id(&self, chat_user_id: &ChatUserId) -> Result<User, UserServiceError> {
        self.users
            .find_by_chat_user_id(chat_user_id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound {
                id: chat_user_id.to_string(),
            })
    }

    /// Apply the present fields of `request` if `request.revision` is
    /// current. Conversation status is left alone.
    pub async fn update(
        &self,
        id: &UserId,
        request: UpdateUserRequest,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get(id).await?;
        if user.revision != request.revision {
            return Err(UserPersistenceError::revision_mismatch(request.revision, user.revision).into());
        }
        if let Some(area) = request.selected_area_id.as_deref() {
            self.select_area(&mut user, area).await?;
        }
        if let Some(time) = request.notify_time {
            user.notify_time = Some(time);
        }
        if let Some(active) = request.is_active {
            user.is_active = active;
        }
        user.revision = request.revision.saturating_add(1);
        user.updated_at = self.clock.utc();
        self.users.update(&user, request.revision).await?;
        Ok(user)
    }

    pub async fn delete(&self, id: &UserId) -> Result<(), UserServiceError> {
        self.users.delete(id).await?;
        info!(user_id = %id, "user deleted via administration api");
        Ok(())
    }
}

#[async_trait]
impl UserAdministration for UserService {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        self.create(request).await.map_err(Error::from)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.get(id).await.map_err(Error::from)
    }

    async fn get_user_by_chat_id(&self, chat_user_id: &ChatUserId) -> Result<User, Error> {
        self.get_by_chat_id(chat_user_id).await.map_err(Error::from)
    }

    async fn update_user(&self, id: &UserId, request: UpdateUserRequest) -> Result<User, Error> {
        self.update(id, request).await.map_err(Error::from)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        self.delete(id).await.map_err(Error::from)
    }
}
