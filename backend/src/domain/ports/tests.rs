use super::*;
use actix_rt::System;
use rstest::rstest;

use crate::domain::{ChatUserId, ErrorCode, NotifyTime};

struct EchoCatalog;

impl MessageCatalog for EchoCatalog {
    fn text(&self, key: &str) -> String {
        match key {
            "pair" => "{0} と {1}".to_owned(),
            other => other.to_owned(),
        }
    }
}

#[rstest]
fn catalog_render_substitutes_each_position() {
    assert_eq!(EchoCatalog.render("pair", &["東京", "大阪"]), "東京 と 大阪");
    assert_eq!(EchoCatalog.render("missing", &["x"]), "missing");
}

#[rstest]
fn quick_reply_echo_uses_label_as_value() {
    let option = QuickReplyOption::echo("はい");
    assert_eq!(option.label, option.value);
}

#[rstest]
fn chat_event_exposes_sender() {
    let sender = ChatUserId::new("U1").expect("chat id");
    let event = ChatEvent::TextReceived {
        chat_user_id: sender.clone(),
        reply_token: ReplyToken::new("t"),
        text: "hello".to_owned(),
    };
    assert_eq!(event.chat_user_id(), &sender);
}

#[rstest]
fn port_error_constructors_render_messages() {
    assert_eq!(
        UserPersistenceError::revision_mismatch(2_u32, 5_u32).to_string(),
        "revision mismatch: expected 2, found 5"
    );
    assert_eq!(
        AreaRepositoryError::unsupported_level("class20").to_string(),
        "children are not stored under level class20"
    );
    assert!(NotificationHistoryRepositoryError::connection("x").is_retryable());
    assert!(!NotificationHistoryRepositoryError::query("x").is_retryable());
}

#[rstest]
fn fixtures_behave_predictably() {
    System::new().block_on(async {
        let err = FixtureAreaQuery
            .hierarchy("1310400")
            .await
            .expect_err("fixture knows no areas");
        assert_eq!(err.code(), ErrorCode::NotFound);

        let body = FixtureForecastSource
            .fetch_forecast("130000")
            .await
            .expect("fixture body");
        assert_eq!(body, b"[]");

        let window = BatchWindow::new(
            "08:00".parse::<NotifyTime>().expect("time"),
            "09:00".parse::<NotifyTime>().expect("time"),
        );
        let summary = FixtureWeatherBatchCommand
            .run(Some(window))
            .await
            .expect("fixture batch");
        assert_eq!(summary.window, window);
        assert_eq!(summary.due, 0);

        FixtureChatEventHandler
            .handle(ChatEvent::Followed {
                chat_user_id: ChatUserId::new("U1").expect("chat id"),
                reply_token: ReplyToken::new("t"),
            })
            .await
            .expect("fixture handler accepts events");
    });
}
