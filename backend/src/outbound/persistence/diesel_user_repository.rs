//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Updates are conditional on the stored revision. When an update touches no
//! rows the adapter re-reads the row to tell a stale revision apart from a
//! missing user.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{ChatUserId, ConversationStatus, NotifyTime, User, UserId};

use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        )
        | DieselError::BrokenTransactionManager => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

/// Insert failures additionally recognise the `chat_user_id` unique index.
fn map_insert_error(error: diesel::result::Error, chat_user_id: &str) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserPersistenceError::duplicate_chat_user(chat_user_id)
        }
        other => map_diesel_error(other),
    }
}

/// Cast domain revision (u32) to database revision (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revision values are always small positive integers"
)]
fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

#[expect(
    clippy::cast_sign_loss,
    reason = "revision is always non-negative in database"
)]
fn cast_revision_from_db(revision: i32) -> u32 {
    revision as u32
}

/// Convert a database row to a domain user.
///
/// A row that no longer satisfies the domain invariants is reported as a
/// query failure rather than silently repaired.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let chat_user_id = ChatUserId::new(row.chat_user_id)
        .map_err(|err| UserPersistenceError::query(format!("invalid stored chat user id: {err}")))?;
    let status: ConversationStatus = row
        .status
        .parse()
        .map_err(|err| UserPersistenceError::query(format!("invalid stored status: {err}")))?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        chat_user_id,
        selected_area_office_id: row.selected_area_office_id,
        selected_area_class15_id: row.selected_area_class15_id,
        selected_area_id: row.selected_area_id,
        notify_time: row.notify_time.map(NotifyTime::new),
        is_active: row.is_active,
        status,
        revision: cast_revision_from_db(row.revision),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

/// Work out why a revision-guarded update touched nothing.
async fn handle_update_failure<C>(
    conn: &mut C,
    id: Uuid,
    expected_revision: u32,
) -> UserPersistenceError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = users::table
        .filter(users::id.eq(id))
        .select(users::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(revision)) => UserPersistenceError::revision_mismatch(
            expected_revision,
            cast_revision_from_db(revision),
        ),
        Ok(None) => UserPersistenceError::not_found(id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: *user.id.as_uuid(),
            chat_user_id: user.chat_user_id.as_str(),
            selected_area_office_id: user.selected_area_office_id.as_deref(),
            selected_area_class15_id: user.selected_area_class15_id.as_deref(),
            selected_area_id: user.selected_area_id.as_deref(),
            notify_time: user.notify_time.map(NotifyTime::time),
            is_active: user.is_active,
            status: user.status.as_str(),
            revision: cast_revision_for_db(user.revision),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, user.chat_user_id.as_str()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_chat_user_id(
        &self,
        chat_user_id: &ChatUserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::chat_user_id.eq(chat_user_id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        user: &User,
        expected_revision: u32,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserUpdate {
            selected_area_office_id: user.selected_area_office_id.as_deref(),
            selected_area_class15_id: user.selected_area_class15_id.as_deref(),
            selected_area_id: user.selected_area_id.as_deref(),
            notify_time: user.notify_time.map(NotifyTime::time),
            is_active: user.is_active,
            status: user.status.as_str(),
            revision: cast_revision_for_db(user.revision),
            updated_at: user.updated_at,
        };

        let updated = diesel::update(
            users::table
                .filter(users::id.eq(user.id.as_uuid()))
                .filter(users::revision.eq(cast_revision_for_db(expected_revision))),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(handle_update_failure(&mut conn, *user.id.as_uuid(), expected_revision).await);
        }
        Ok(())
    }

    async fn find_due_in_window(
        &self,
        start: NotifyTime,
        end: NotifyTime,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (start, end) = (start.time(), end.time());
        let query = users::table
            .select(UserRow::as_select())
            .order(users::notify_time.asc())
            .into_boxed();
        let query = if start <= end {
            query.filter(users::notify_time.ge(start).and(users::notify_time.lt(end)))
        } else {
            query.filter(users::notify_time.ge(start).or(users::notify_time.lt(end)))
        };

        let rows: Vec<UserRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(UserPersistenceError::not_found(id.to_string()));
        }
        Ok(())
    }
}
