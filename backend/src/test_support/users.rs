//! In-memory user repository honouring revision checks.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository, window_contains};
use crate::domain::{ChatUserId, NotifyTime, User, UserId};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().collect()),
        }
    }

    /// Current copy of the user with `chat_user_id`.
    pub fn get_by_chat(&self, chat_user_id: &str) -> Option<User> {
        self.lock()
            .iter()
            .find(|u| u.chat_user_id.as_str() == chat_user_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        match self.users.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("user store mutex"),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock();
        if users.iter().any(|u| u.chat_user_id == user.chat_user_id) {
            return Err(UserPersistenceError::duplicate_chat_user(
                user.chat_user_id.as_str(),
            ));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_chat_user_id(
        &self,
        chat_user_id: &ChatUserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|u| u.chat_user_id == *chat_user_id)
            .cloned())
    }

    async fn update(&self, user: &User, expected_revision: u32) -> Result<(), UserPersistenceError> {
        let mut users = self.lock();
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| UserPersistenceError::not_found(user.id.to_string()))?;
        if stored.revision != expected_revision {
            return Err(UserPersistenceError::revision_mismatch(
                expected_revision,
                stored.revision,
            ));
        }
        *stored = user.clone();
        Ok(())
    }

    async fn find_due_in_window(
        &self,
        start: NotifyTime,
        end: NotifyTime,
    ) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .filter(|u| u.notify_time.is_some_and(|t| window_contains(start, end, t)))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut users = self.lock();
        let before = users.len();
        users.retain(|u| u.id != *id);
        if users.len() == before {
            return Err(UserPersistenceError::not_found(id.to_string()));
        }
        Ok(())
    }
}
