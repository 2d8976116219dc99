//! Conversation flow tests over in-memory stores.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{AreaRepositoryError, MockAreaRepository, MockUserRepository};
use crate::domain::{ErrorCode, StaticMessageCatalog};
use crate::test_support::areas::{InMemoryAreaRepository, node};
use crate::test_support::users::InMemoryUserRepository;
use crate::test_support::{MutableClock, RecordingMessenger};

const CHAT_ID: &str = "U-flow";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0)
        .single()
        .expect("valid time")
}

fn chat_id() -> ChatUserId {
    ChatUserId::new(CHAT_ID).expect("chat id")
}

struct Flow {
    users: Arc<InMemoryUserRepository>,
    areas: Arc<InMemoryAreaRepository>,
    messenger: Arc<RecordingMessenger>,
    service: ConversationService,
}

impl Flow {
    fn with_user(status: ConversationStatus, edit: impl FnOnce(&mut User)) -> Self {
        let mut user = User::new_follower(chat_id(), now());
        user.status = status;
        edit(&mut user);
        Self::build(InMemoryUserRepository::with_users([user]))
    }

    fn build(users: InMemoryUserRepository) -> Self {
        let users = Arc::new(users);
        let areas = Arc::new(InMemoryAreaRepository::sample());
        let messenger = Arc::new(RecordingMessenger::default());
        let service = ConversationService::new(
            users.clone(),
            AreaHierarchyService::new(areas.clone()),
            messenger.clone(),
            Arc::new(StaticMessageCatalog::japanese()),
            Arc::new(MutableClock::new(now())),
        );
        Self {
            users,
            areas,
            messenger,
            service,
        }
    }

    async fn say(&self, text: &str) {
        self.service
            .handle_event(ChatEvent::TextReceived {
                chat_user_id: chat_id(),
                reply_token: ReplyToken::new("token"),
                text: text.to_owned(),
            })
            .await
            .expect("event handled");
    }

    fn user(&self) -> User {
        self.users.get_by_chat(CHAT_ID).expect("user stored")
    }

    fn last_message(&self) -> OutgoingMessage {
        self.messenger
            .replies()
            .last()
            .and_then(|reply| reply.messages.last().cloned())
            .expect("a reply was sent")
    }
}

fn tokyo(user: &mut User) {
    user.selected_area_office_id = Some("130000".to_owned());
}

fn confirming_shinjuku(user: &mut User) {
    tokyo(user);
    user.selected_area_class15_id = Some("130011".to_owned());
    user.selected_area_id = Some("1310400".to_owned());
}

fn labels(message: &OutgoingMessage) -> Vec<&str> {
    message.quick_replies.iter().map(|o| o.label.as_str()).collect()
}

#[fixture]
fn fresh() -> Flow {
    Flow::build(InMemoryUserRepository::new())
}

#[rstest]
#[tokio::test]
async fn follow_creates_user_once_and_greets(fresh: Flow) {
    for _ in 0..2 {
        fresh
            .service
            .handle_event(ChatEvent::Followed {
                chat_user_id: chat_id(),
                reply_token: ReplyToken::new("follow"),
            })
            .await
            .expect("follow handled");
    }

    assert_eq!(fresh.users.len(), 1);
    let user = fresh.user();
    assert_eq!(user.status, ConversationStatus::AwaitingPrefecture);
    assert!(user.is_active);
    assert_eq!(
        fresh.messenger.last_texts(),
        vec![
            "こんにちは！ご登録ありがとうございます。",
            "都道府県名を入力してください（例: 東京都、大阪府 など）",
        ]
    );
}

#[rstest]
#[tokio::test]
async fn text_from_unknown_user_is_dropped(fresh: Flow) {
    fresh.say("東京都").await;

    assert!(fresh.users.is_empty());
    assert!(fresh.messenger.replies().is_empty());
}

#[rstest]
#[tokio::test]
async fn prefecture_match_records_office_and_asks_municipality() {
    let flow = Flow::with_user(ConversationStatus::AwaitingPrefecture, |_| {});

    flow.say("東京都").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingMunicipality);
    assert_eq!(user.selected_area_office_id.as_deref(), Some("130000"));
    assert_eq!(user.revision, 2);
    assert_eq!(
        flow.last_message().text,
        "市区町村名を入力してください（例: 新宿区、名古屋市 など）"
    );
}

#[rstest]
#[tokio::test]
async fn unknown_prefecture_keeps_state() {
    let flow = Flow::with_user(ConversationStatus::AwaitingPrefecture, |_| {});

    flow.say("アトランティス").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingPrefecture);
    assert_eq!(user.revision, 1, "nothing persisted");
    assert_eq!(
        flow.last_message().text,
        "都道府県が見つかりませんでした。正しい都道府県名を入力してください。"
    );
}

#[rstest]
#[tokio::test]
async fn municipality_match_asks_for_confirmation() {
    let flow = Flow::with_user(ConversationStatus::AwaitingMunicipality, tokyo);

    flow.say(" 新宿 ").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingConfirmation);
    assert_eq!(user.selected_area_id.as_deref(), Some("1310400"));
    assert_eq!(user.selected_area_class15_id.as_deref(), Some("130011"));
    let message = flow.last_message();
    assert_eq!(message.text, "新宿区 でよろしいですか？");
    assert_eq!(labels(&message), vec!["はい", "いいえ"]);
}

#[rstest]
#[tokio::test]
async fn municipality_outside_chosen_office_still_matches() {
    let flow = Flow::with_user(ConversationStatus::AwaitingMunicipality, |user| {
        user.selected_area_office_id = Some("270000".to_owned());
    });

    flow.say("新宿").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingConfirmation);
    assert_eq!(user.selected_area_id.as_deref(), Some("1310400"));
    assert_eq!(user.selected_area_office_id.as_deref(), Some("130000"));
    assert_eq!(flow.last_message().text, "新宿区 でよろしいですか？");
}

#[rstest]
#[tokio::test]
async fn municipality_prefers_candidates_in_chosen_office() {
    // "大" matches 大阪市 first, then 大島町 under Tokyo.
    let flow = Flow::with_user(ConversationStatus::AwaitingMunicipality, tokyo);

    flow.say("大").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingConfirmation);
    assert_eq!(user.selected_area_id.as_deref(), Some("1336100"));
    assert_eq!(user.selected_area_class15_id.as_deref(), Some("130021"));
}

#[rstest]
#[tokio::test]
async fn unknown_municipality_keeps_state() {
    let flow = Flow::with_user(ConversationStatus::AwaitingMunicipality, tokyo);

    flow.say("アトランティス").await;

    assert_eq!(flow.user().status, ConversationStatus::AwaitingMunicipality);
    assert_eq!(flow.user().revision, 1, "nothing persisted");
    assert_eq!(
        flow.last_message().text,
        "市区町村が見つかりませんでした。正しい市区町村名を入力してください。"
    );
}

#[rstest]
#[tokio::test]
async fn yes_completes_without_touching_selection() {
    let flow = Flow::with_user(ConversationStatus::AwaitingConfirmation, confirming_shinjuku);

    flow.say("はい").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::Completed);
    assert_eq!(user.selected_area_id.as_deref(), Some("1310400"));
    assert_eq!(flow.last_message().text, "地域の登録が完了しました！");
}

#[rstest]
#[tokio::test]
async fn no_offers_class10_areas_and_escape_option() {
    let flow = Flow::with_user(ConversationStatus::AwaitingConfirmation, confirming_shinjuku);

    flow.say("いいえ").await;

    assert_eq!(
        flow.user().status,
        ConversationStatus::AwaitingAreaClass10Selection
    );
    let message = flow.last_message();
    assert_eq!(labels(&message), vec!["東京地方", "伊豆諸島北部", "この中にはない"]);
    assert_eq!(message.quick_replies[0].value, "130010");
    assert_eq!(message.quick_replies[2].value, "この中にはない");
}

#[rstest]
#[case::no_office(None)]
#[case::office_without_children(Some("010300"))]
#[tokio::test]
async fn no_without_class10_areas_keeps_confirming(#[case] office: Option<&str>) {
    let flow = Flow::with_user(ConversationStatus::AwaitingConfirmation, |user| {
        confirming_shinjuku(user);
        user.selected_area_office_id = office.map(str::to_owned);
    });

    flow.say("いいえ").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingConfirmation);
    assert_eq!(user.revision, 1, "nothing persisted");
    let message = flow.last_message();
    assert_eq!(
        message.text,
        "選択された地域が見つかりませんでした。もう一度選択してください。"
    );
    assert!(message.quick_replies.is_empty());
}

#[rstest]
#[tokio::test]
async fn no_with_failing_area_store_keeps_confirming() {
    let mut areas = MockAreaRepository::new();
    areas
        .expect_find_children()
        .returning(|_, _| Err(AreaRepositoryError::connection("timeout")));
    let mut user = User::new_follower(chat_id(), now());
    user.status = ConversationStatus::AwaitingConfirmation;
    confirming_shinjuku(&mut user);
    let users = Arc::new(InMemoryUserRepository::with_users([user]));
    let messenger = Arc::new(RecordingMessenger::default());
    let service = ConversationService::new(
        users.clone(),
        AreaHierarchyService::new(Arc::new(areas)),
        messenger.clone(),
        Arc::new(StaticMessageCatalog::japanese()),
        Arc::new(MutableClock::new(now())),
    );

    service
        .handle_event(ChatEvent::TextReceived {
            chat_user_id: chat_id(),
            reply_token: ReplyToken::new("token"),
            text: "いいえ".to_owned(),
        })
        .await
        .expect("lookup failures are answered in chat");

    let stored = users.get_by_chat(CHAT_ID).expect("user stored");
    assert_eq!(stored.status, ConversationStatus::AwaitingConfirmation);
    assert_eq!(
        messenger.last_texts(),
        vec!["選択された地域が見つかりませんでした。もう一度選択してください。"]
    );
}

#[rstest]
#[tokio::test]
async fn unrecognised_confirmation_reprompts() {
    let flow = Flow::with_user(ConversationStatus::AwaitingConfirmation, confirming_shinjuku);

    flow.say("たぶん").await;

    assert_eq!(flow.user().status, ConversationStatus::AwaitingConfirmation);
    let message = flow.last_message();
    assert_eq!(message.text, "「はい」か「いいえ」で答えてください。");
    assert_eq!(labels(&message), vec!["はい", "いいえ"]);
}

#[rstest]
#[tokio::test]
async fn not_in_list_restarts_and_keeps_fields() {
    let flow = Flow::with_user(
        ConversationStatus::AwaitingAreaClass10Selection,
        confirming_shinjuku,
    );
    let before = flow.user();

    flow.say("この中にはない").await;

    let after = flow.user();
    assert_eq!(after.status, ConversationStatus::AwaitingPrefecture);
    assert_eq!(after.selected_area_office_id, before.selected_area_office_id);
    assert_eq!(after.selected_area_class15_id, before.selected_area_class15_id);
    assert_eq!(after.selected_area_id, before.selected_area_id);
    assert_eq!(
        flow.last_message().text,
        "都道府県名を入力してください（例: 東京都、大阪府 など）"
    );
}

#[rstest]
#[tokio::test]
async fn class10_pick_lists_class15_children() {
    let flow = Flow::with_user(ConversationStatus::AwaitingAreaClass10Selection, tokyo);

    flow.say("130010").await;

    assert_eq!(
        flow.user().status,
        ConversationStatus::AwaitingAreaClass15Selection
    );
    assert_eq!(labels(&flow.last_message()), vec!["23区西部", "23区東部"]);
}

#[rstest]
#[case::class10(ConversationStatus::AwaitingAreaClass10Selection)]
#[case::class15(ConversationStatus::AwaitingAreaClass15Selection)]
#[case::class20(ConversationStatus::AwaitingAreaClass20Selection)]
#[tokio::test]
async fn unknown_pick_keeps_selection_state(#[case] status: ConversationStatus) {
    let flow = Flow::with_user(status, tokyo);

    flow.say("9999999").await;

    assert_eq!(flow.user().status, status);
    assert_eq!(
        flow.last_message().text,
        "選択された地域が見つかりませんでした。もう一度選択してください。"
    );
}

#[rstest]
#[tokio::test]
async fn class15_pick_records_id_and_lists_leaves() {
    let flow = Flow::with_user(ConversationStatus::AwaitingAreaClass15Selection, tokyo);

    flow.say("130012").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::AwaitingAreaClass20Selection);
    assert_eq!(user.selected_area_class15_id.as_deref(), Some("130012"));
    let message = flow.last_message();
    assert_eq!(labels(&message), vec!["千代田区"]);
    assert_eq!(message.quick_replies[0].value, "1310100");
}

#[rstest]
#[tokio::test]
async fn class20_pick_completes_with_resolved_chain() {
    let flow = Flow::with_user(ConversationStatus::AwaitingAreaClass20Selection, |user| {
        user.selected_area_class15_id = Some("130012".to_owned());
    });

    flow.say("1310100").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::Completed);
    assert_eq!(user.selected_area_id.as_deref(), Some("1310100"));
    assert_eq!(user.selected_area_office_id.as_deref(), Some("130000"));
}

#[rstest]
#[tokio::test]
async fn completed_users_get_default_reply_only() {
    let flow = Flow::with_user(ConversationStatus::Completed, confirming_shinjuku);

    flow.say("東京都").await;

    let user = flow.user();
    assert_eq!(user.status, ConversationStatus::Completed);
    assert_eq!(user.revision, 1);
    assert_eq!(
        flow.last_message().text,
        "現在の設定状況です。必要に応じて情報を更新してください。"
    );
}

#[rstest]
#[tokio::test]
async fn class10_options_stay_within_platform_limit() {
    let flow = Flow::with_user(ConversationStatus::AwaitingConfirmation, confirming_shinjuku);
    for index in 0..15 {
        flow.areas.insert(
            AreaLevel::Class10,
            node(&format!("1399{index:02}"), &format!("地域{index}"), Some("130000")),
        );
    }

    flow.say("いいえ").await;

    let message = flow.last_message();
    assert_eq!(message.quick_replies.len(), MAX_QUICK_REPLIES);
    assert_eq!(
        message.quick_replies.last().map(|o| o.label.as_str()),
        Some("この中にはない")
    );
}

#[rstest]
#[tokio::test]
async fn stale_revision_escalates_without_replying() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_chat_user_id()
        .returning(|_| Ok(Some(User::new_follower(chat_id(), now()))));
    users
        .expect_update()
        .withf(|user, expected| *expected == 1 && user.revision == 2)
        .returning(|_, _| Err(UserPersistenceError::revision_mismatch(1_u32, 3_u32)));
    let messenger = Arc::new(RecordingMessenger::default());
    let service = ConversationService::new(
        Arc::new(users),
        AreaHierarchyService::new(Arc::new(InMemoryAreaRepository::sample())),
        messenger.clone(),
        Arc::new(StaticMessageCatalog::japanese()),
        Arc::new(MutableClock::new(now())),
    );

    let err = service
        .handle(ChatEvent::TextReceived {
            chat_user_id: chat_id(),
            reply_token: ReplyToken::new("token"),
            text: "東京都".to_owned(),
        })
        .await
        .expect_err("conflict surfaces");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert!(messenger.replies().is_empty());
}

#[rstest]
#[tokio::test]
async fn area_store_failure_is_answered_as_not_found() {
    let mut areas = MockAreaRepository::new();
    areas
        .expect_find_office_by_name()
        .returning(|_| Err(AreaRepositoryError::connection("timeout")));
    let messenger = Arc::new(RecordingMessenger::default());
    let service = ConversationService::new(
        Arc::new(InMemoryUserRepository::with_users([User::new_follower(
            chat_id(),
            now(),
        )])),
        AreaHierarchyService::new(Arc::new(areas)),
        messenger.clone(),
        Arc::new(StaticMessageCatalog::japanese()),
        Arc::new(MutableClock::new(now())),
    );

    service
        .handle_event(ChatEvent::TextReceived {
            chat_user_id: chat_id(),
            reply_token: ReplyToken::new("token"),
            text: "東京都".to_owned(),
        })
        .await
        .expect("lookup failures are answered in chat");

    assert_eq!(
        messenger.last_texts(),
        vec!["都道府県が見つかりませんでした。正しい都道府県名を入力してください。"]
    );
}

#[rstest]
#[tokio::test]
async fn reply_failure_surfaces_after_persisting() {
    let flow = Flow::with_user(ConversationStatus::AwaitingPrefecture, |_| {});
    flow.messenger
        .fail_with(ChatMessengerError::rejected(400_u16, "invalid reply token"));

    let err = flow
        .service
        .handle_event(ChatEvent::TextReceived {
            chat_user_id: chat_id(),
            reply_token: ReplyToken::new("expired"),
            text: "東京都".to_owned(),
        })
        .await
        .expect_err("reply failure surfaces");

    assert!(matches!(err, ConversationError::Reply(_)));
    assert_eq!(flow.user().status, ConversationStatus::AwaitingMunicipality);
}
