//! `DieselUserRepository` against embedded PostgreSQL.
//!
//! Covers the revision-guarded update and the notify-time window query,
//! including windows that wrap past midnight.

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};
use weather_bot::domain::ports::{UserPersistenceError, UserRepository};
use weather_bot::domain::{ChatUserId, ConversationStatus, NotifyTime, User, UserId};
use weather_bot::outbound::persistence::DieselUserRepository;

mod support;

use support::{TestDatabase, handle_cluster_setup_failure};

#[fixture]
fn database() -> Option<TestDatabase> {
    match TestDatabase::start() {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn registered_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0)
        .single()
        .expect("valid time")
}

fn time(raw: &str) -> NotifyTime {
    raw.parse().expect("valid notify time")
}

fn follower(chat_user_id: &str, notify_time: Option<&str>) -> User {
    let mut user = User::new_follower(
        ChatUserId::new(chat_user_id).expect("valid chat id"),
        registered_at(),
    );
    user.notify_time = notify_time.map(time);
    user
}

#[rstest]
fn created_users_are_found_by_either_id(database: Option<TestDatabase>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: created_users_are_found_by_either_id skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());
    let user = follower("U-create", Some("07:30"));

    let (by_id, by_chat) = db.runtime.block_on(async {
        repo.create(&user).await.expect("create succeeds");
        let by_id = repo.find_by_id(&user.id).await.expect("lookup by id");
        let by_chat = repo
            .find_by_chat_user_id(&user.chat_user_id)
            .await
            .expect("lookup by chat id");
        (by_id, by_chat)
    });

    assert_eq!(by_id.as_ref(), Some(&user));
    assert_eq!(by_chat, Some(user));
}

#[rstest]
fn a_second_row_for_the_same_chat_user_is_rejected(database: Option<TestDatabase>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: a_second_row_for_the_same_chat_user_is_rejected skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());

    let err = db.runtime.block_on(async {
        repo.create(&follower("U-dup", None)).await.expect("first insert");
        repo.create(&follower("U-dup", None))
            .await
            .expect_err("second insert")
    });

    assert_eq!(err, UserPersistenceError::duplicate_chat_user("U-dup"));
    assert_eq!(db.count_rows("users").expect("count users"), 1);
}

#[rstest]
fn updates_apply_only_against_the_stored_revision(database: Option<TestDatabase>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: updates_apply_only_against_the_stored_revision skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());
    let user = follower("U-rev", None);

    let (stale, stored) = db.runtime.block_on(async {
        repo.create(&user).await.expect("create succeeds");

        let mut renamed = user.clone();
        renamed.status = ConversationStatus::AwaitingMunicipality;
        renamed.revision = 2;
        repo.update(&renamed, 1).await.expect("fresh update");

        let mut late = user.clone();
        late.status = ConversationStatus::Completed;
        late.revision = 2;
        let stale = repo.update(&late, 1).await.expect_err("stale update");

        let stored = repo.find_by_id(&user.id).await.expect("lookup");
        (stale, stored)
    });

    assert_eq!(stale, UserPersistenceError::revision_mismatch(1_u32, 2_u32));
    let stored = stored.expect("user still stored");
    assert_eq!(stored.revision, 2);
    assert_eq!(stored.status, ConversationStatus::AwaitingMunicipality);
}

#[rstest]
fn updating_an_unknown_user_is_not_found(database: Option<TestDatabase>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: updating_an_unknown_user_is_not_found skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());
    let ghost = follower("U-ghost", None);

    let err = db
        .runtime
        .block_on(repo.update(&ghost, 1))
        .expect_err("nothing to update");

    assert_eq!(err, UserPersistenceError::not_found(ghost.id.to_string()));
}

#[rstest]
fn deleting_removes_the_row_once(database: Option<TestDatabase>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_removes_the_row_once skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());
    let user = follower("U-delete", None);

    let second = db.runtime.block_on(async {
        repo.create(&user).await.expect("create succeeds");
        repo.delete(&user.id).await.expect("first delete");
        repo.delete(&user.id).await
    });

    assert_eq!(second, Err(UserPersistenceError::not_found(user.id.to_string())));
    assert_eq!(db.count_rows("users").expect("count users"), 0);
}

#[rstest]
#[case::daytime("08:00", "09:00", &["U0800", "U0830"])]
#[case::wraps_midnight("23:30", "00:30", &["U0000", "U0029", "U2345"])]
#[case::empty("08:00", "08:00", &[])]
fn due_users_fall_in_the_half_open_window(
    database: Option<TestDatabase>,
    #[case] start: &str,
    #[case] end: &str,
    #[case] expected: &[&str],
) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: due_users_fall_in_the_half_open_window skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());
    let users = [
        follower("U0759", Some("07:59")),
        follower("U0800", Some("08:00")),
        follower("U0830", Some("08:30")),
        follower("U0900", Some("09:00")),
        follower("U2345", Some("23:45")),
        follower("U0000", Some("00:00")),
        follower("U0029", Some("00:29")),
        follower("U0030", Some("00:30")),
        follower("Unset", None),
    ];

    let due = db.runtime.block_on(async {
        for user in &users {
            repo.create(user).await.expect("create succeeds");
        }
        repo.find_due_in_window(time(start), time(end))
            .await
            .expect("window query")
    });

    let chat_ids: Vec<&str> = due.iter().map(|user| user.chat_user_id.as_str()).collect();
    assert_eq!(chat_ids, expected);
}

#[rstest]
fn lookups_miss_cleanly(database: Option<TestDatabase>) {
    let Some(db) = database else {
        eprintln!("SKIP-TEST-CLUSTER: lookups_miss_cleanly skipped");
        return;
    };
    let repo = DieselUserRepository::new(db.pool.clone());

    let (by_id, by_chat) = db.runtime.block_on(async {
        let by_id = repo.find_by_id(&UserId::random()).await.expect("lookup by id");
        let by_chat = repo
            .find_by_chat_user_id(&ChatUserId::new("U-nobody").expect("valid chat id"))
            .await
            .expect("lookup by chat id");
        (by_id, by_chat)
    });

    assert_eq!(by_id, None);
    assert_eq!(by_chat, None);
}
