//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{ChatUserId, NotifyTime, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A user with the same chat id already exists.
        DuplicateChatUser { chat_user_id: String } =>
            "chat user {chat_user_id} is already registered",
        /// The row changed since it was read.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The user to update or delete does not exist.
        NotFound { id: String } => "user {id} not found",
    }
}

/// Storage for bot users.
///
/// # Revision semantics
///
/// - `create` stores `user.revision` as given (normally 1).
/// - `update` succeeds only when the stored revision equals
///   `expected_revision`; the caller sets `user.revision` to the new value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by internal identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by chat platform identifier.
    async fn find_by_chat_user_id(
        &self,
        chat_user_id: &ChatUserId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace the mutable fields of `user` when the stored revision matches.
    async fn update(&self, user: &User, expected_revision: u32)
    -> Result<(), UserPersistenceError>;

    /// Users whose notify time falls in `[start, end)`, ignoring the date.
    ///
    /// When `start > end` the window wraps past midnight.
    async fn find_due_in_window(
        &self,
        start: NotifyTime,
        end: NotifyTime,
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Remove a user. Administrative only.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}

/// Whether `time` lies in the half-open window, wrapping past midnight when
/// `start > end`.
#[must_use]
pub fn window_contains(start: NotifyTime, end: NotifyTime, time: NotifyTime) -> bool {
    if start <= end {
        start <= time && time < end
    } else {
        time >= start || time < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn t(raw: &str) -> NotifyTime {
        raw.parse().expect("valid time")
    }

    #[rstest]
    #[case("08:00", "09:00", "08:00", true)]
    #[case("08:00", "09:00", "08:59", true)]
    #[case("08:00", "09:00", "09:00", false)]
    #[case("08:00", "09:00", "07:59", false)]
    #[case("23:30", "00:30", "23:45", true)]
    #[case("23:30", "00:30", "00:10", true)]
    #[case("23:30", "00:30", "00:30", false)]
    #[case("23:30", "00:30", "12:00", false)]
    #[case("08:00", "08:00", "08:00", false)]
    fn window_is_half_open(
        #[case] start: &str,
        #[case] end: &str,
        #[case] time: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(window_contains(t(start), t(end), t(time)), expected);
    }
}
