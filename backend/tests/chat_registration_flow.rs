//! End-to-end coverage of the webhook registration flow and the batch.
//!
//! The app is assembled from the real domain services over the in-memory
//! repositories, so requests travel the same path as in production up to the
//! outbound ports.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;

use weather_bot::domain::ports::{
    ForecastSource, ForecastSourceError, WeatherRuleRepository, WeatherRuleRepositoryError,
};
use weather_bot::domain::{
    AreaHierarchyService, ConversationService, StaticMessageCatalog, UserService,
    WeatherEvaluationConfig, WeatherEvaluationPorts, WeatherEvaluationService, WeatherRule,
};
use weather_bot::inbound::http::state::{ChannelSecret, HttpState, HttpStatePorts};
use weather_bot::inbound::http::users::{get_user_by_chat_id, update_user};
use weather_bot::inbound::http::weather::process_weather;
use weather_bot::inbound::http::webhook::{SIGNATURE_HEADER, receive_webhook};
use weather_bot::inbound::http::json_config;
use weather_bot::test_support::areas::InMemoryAreaRepository;
use weather_bot::test_support::users::InMemoryUserRepository;
use weather_bot::test_support::{
    MutableClock, RecordingHistorySink, RecordingMessenger, forecast_document,
};

const SECRET: &str = "channel-secret";

// 2026-06-01 08:30 in Tokyo.
fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 31, 23, 30, 0)
        .single()
        .expect("valid time")
}

/// Serves the same Tokyo document for every office.
struct StaticForecasts;

#[async_trait]
impl ForecastSource for StaticForecasts {
    async fn fetch_forecast(&self, office_id: &str) -> Result<Vec<u8>, ForecastSourceError> {
        if office_id != "130000" {
            return Err(ForecastSourceError::invalid_request(format!(
                "unexpected office {office_id}"
            )));
        }
        Ok(forecast_document(
            "130010",
            &["2026-06-01T11:00:00+09:00", "2026-06-02T00:00:00+09:00"],
            &["101", "300"],
        ))
    }
}

/// Rain codes trigger; everything else does not.
struct RainRules;

#[async_trait]
impl WeatherRuleRepository for RainRules {
    async fn find_by_code(
        &self,
        weather_code: &str,
    ) -> Result<Option<WeatherRule>, WeatherRuleRepositoryError> {
        Ok(Some(WeatherRule::new(
            weather_code,
            "fixture",
            weather_code.starts_with('3'),
        )))
    }
}

struct World {
    users: Arc<InMemoryUserRepository>,
    messenger: Arc<RecordingMessenger>,
    history: Arc<RecordingHistorySink>,
    state: web::Data<HttpState>,
}

fn world() -> World {
    let users = Arc::new(InMemoryUserRepository::new());
    let messenger = Arc::new(RecordingMessenger::default());
    let history = Arc::new(RecordingHistorySink::default());
    let clock = Arc::new(MutableClock::new(morning()));
    let areas = AreaHierarchyService::new(Arc::new(InMemoryAreaRepository::sample()));

    let conversation = ConversationService::new(
        users.clone(),
        areas.clone(),
        messenger.clone(),
        Arc::new(StaticMessageCatalog::japanese()),
        clock.clone(),
    );
    let evaluation = WeatherEvaluationService::new(
        WeatherEvaluationPorts {
            users: users.clone(),
            areas: areas.clone(),
            rules: Arc::new(RainRules),
            forecasts: Arc::new(StaticForecasts),
            history: history.clone(),
        },
        clock.clone(),
        WeatherEvaluationConfig::default(),
    );
    let admin = UserService::new(users.clone(), areas.clone(), clock);

    let state = web::Data::new(HttpState::new(
        HttpStatePorts {
            areas: Arc::new(areas),
            chat_events: Arc::new(conversation),
            weather_batch: Arc::new(evaluation),
            users: Arc::new(admin),
        },
        ChannelSecret::new(SECRET),
    ));

    World {
        users,
        messenger,
        history,
        state,
    }
}

fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).expect("any key length");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

fn follow(token: &str) -> Value {
    json!({
        "type": "follow",
        "replyToken": token,
        "source": {"type": "user", "userId": "U1"},
    })
}

fn text(token: &str, body: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": token,
        "source": {"type": "user", "userId": "U1"},
        "message": {"type": "text", "id": "1", "text": body},
    })
}

async fn deliver<S>(app: &S, event: Value) -> StatusCode
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let body = json!({"destination": "bot", "events": [event]}).to_string();
    let request = test::TestRequest::post()
        .uri("/webhook")
        .insert_header((SIGNATURE_HEADER, sign(body.as_bytes())))
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
        .to_request();
    test::call_service(app, request).await.status()
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(json_config())
                .service(receive_webhook)
                .service(
                    web::scope("/api/v1")
                        .service(process_weather)
                        .service(get_user_by_chat_id)
                        .service(update_user),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn a_follower_registers_an_area_through_the_webhook() {
    let world = world();
    let app = app!(world.state);

    assert_eq!(deliver(&app, follow("rt-1")).await, StatusCode::OK);
    assert_eq!(world.messenger.replies().len(), 1);
    assert_eq!(world.messenger.replies()[0].messages.len(), 2);

    assert_eq!(deliver(&app, text("rt-2", "東京都")).await, StatusCode::OK);
    assert_eq!(deliver(&app, text("rt-3", "新宿")).await, StatusCode::OK);
    assert_eq!(
        world.messenger.last_texts(),
        vec!["新宿区 でよろしいですか？".to_owned()]
    );

    assert_eq!(deliver(&app, text("rt-4", "はい")).await, StatusCode::OK);
    assert_eq!(
        world.messenger.last_texts(),
        vec!["地域の登録が完了しました！".to_owned()]
    );

    let tokens: Vec<_> = world
        .messenger
        .replies()
        .into_iter()
        .map(|reply| reply.reply_token)
        .collect();
    assert_eq!(tokens, ["rt-1", "rt-2", "rt-3", "rt-4"]);

    let request = test::TestRequest::get()
        .uri("/api/v1/users/chat/U1")
        .to_request();
    let user: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(user["status"], "completed");
    assert_eq!(user["selectedAreaId"], "1310400");
    assert_eq!(user["selectedAreaOfficeId"], "130000");
    assert_eq!(world.users.len(), 1);
}

#[actix_web::test]
async fn forged_signatures_leave_no_trace() {
    let world = world();
    let app = app!(world.state);
    let body = json!({"events": [follow("rt-1")]}).to_string();

    let request = test::TestRequest::post()
        .uri("/webhook")
        .insert_header((SIGNATURE_HEADER, sign(b"something else")))
        .set_payload(body)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(world.users.is_empty());
    assert!(world.messenger.replies().is_empty());
}

#[actix_web::test]
async fn a_registered_user_is_evaluated_in_their_window() {
    let world = world();
    let app = app!(world.state);
    for event in [
        follow("rt-1"),
        text("rt-2", "東京都"),
        text("rt-3", "新宿"),
        text("rt-4", "はい"),
    ] {
        assert_eq!(deliver(&app, event).await, StatusCode::OK);
    }
    let registered = world.users.get_by_chat("U1").expect("registered user");

    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}", registered.id))
        .set_json(json!({"notifyTime": "08:15", "revision": registered.revision}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = test::TestRequest::get()
        .uri("/api/v1/process_weather?start=0800&end=0900")
        .to_request();
    let summary: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(summary["due"], 1);
    assert_eq!(summary["succeeded"], 1);
    assert_eq!(summary["failed"], 0);
    let records = world.history.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, registered.id);
    assert_eq!(records[0].weather_codes, ["101", "300"]);
    assert!(records[0].is_notify_trigger);
}

#[actix_web::test]
async fn users_outside_the_window_are_skipped() {
    let world = world();
    let app = app!(world.state);

    let request = test::TestRequest::get()
        .uri("/api/v1/process_weather?start=2300&end=0100")
        .to_request();
    let summary: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(summary["due"], 0);
    assert!(world.history.records().is_empty());
}
