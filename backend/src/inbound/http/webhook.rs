//! Chat platform webhook.
//!
//! ```text
//! POST /webhook
//! X-Line-Signature: base64(HMAC-SHA256(channel secret, body))
//! ```
//!
//! The body is authenticated before it is decoded. A forged signature or a
//! signed body that is not a webhook payload is answered with 400. Follow
//! events and text messages from users are handed to the [`ChatEventHandler`]
//! port in arrival order; everything else is ignored. Per-event failures are
//! logged and the platform still receives 200 so it does not redeliver.
//!
//! [`ChatEventHandler`]: crate::domain::ports::ChatEventHandler

use actix_web::{HttpRequest, HttpResponse, post, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{debug, error, warn};

use crate::domain::ports::{ChatEvent, ReplyToken};
use crate::domain::{ChatUserId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::{ChannelSecret, HttpState};

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    reply_token: Option<String>,
    source: Option<RawSource>,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

impl RawEvent {
    /// Map to a domain event, or `None` when the event is not handled.
    fn into_chat_event(self) -> Option<ChatEvent> {
        let chat_user_id = self
            .source
            .and_then(|source| source.user_id)
            .and_then(|id| ChatUserId::new(id).ok())?;
        let reply_token = ReplyToken::new(self.reply_token?);
        match (self.kind.as_str(), self.message) {
            ("follow", _) => Some(ChatEvent::Followed {
                chat_user_id,
                reply_token,
            }),
            ("message", Some(RawMessage { kind, text: Some(text) })) if kind == "text" => {
                Some(ChatEvent::TextReceived {
                    chat_user_id,
                    reply_token,
                    text,
                })
            }
            _ => None,
        }
    }
}

fn invalid_signature() -> Error {
    Error::invalid_request("invalid webhook signature")
        .with_details(json!({ "header": SIGNATURE_HEADER, "code": "invalid_signature" }))
}

/// Check `signature` against the body using the channel secret.
pub(crate) fn verify_signature(
    secret: &ChannelSecret,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), Error> {
    let signature = signature.ok_or_else(invalid_signature)?;
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| invalid_signature())?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| Error::internal(format!("webhook key rejected: {err}")))?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| invalid_signature())
}

fn decode_events(body: &[u8]) -> Result<Vec<ChatEvent>, Error> {
    let payload: WebhookPayload = serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request("webhook body is not valid JSON")
            .with_details(json!({ "reason": err.to_string() }))
    })?;
    Ok(payload
        .events
        .into_iter()
        .filter_map(|event| {
            let kind = event.kind.clone();
            let mapped = event.into_chat_event();
            if mapped.is_none() {
                debug!(event_type = %kind, "ignoring unsupported webhook event");
            }
            mapped
        })
        .collect())
}

/// Receive chat platform events.
#[utoipa::path(
    post,
    path = "/webhook",
    request_body(content = String, content_type = "application/json"),
    params(
        ("X-Line-Signature" = String, Header, description = "Base64 HMAC-SHA256 of the body")
    ),
    responses(
        (status = 200, description = "Events accepted"),
        (status = 400, description = "Invalid signature or body", body = Error)
    ),
    tags = ["webhook"],
    operation_id = "receiveWebhook"
)]
#[post("/webhook")]
pub async fn receive_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = verify_signature(&state.channel_secret, &body, signature) {
        warn!("rejected webhook with invalid signature");
        return Err(err);
    }

    for event in decode_events(&body)? {
        let chat_user_id = event.chat_user_id().clone();
        if let Err(err) = state.chat_events.handle(event).await {
            error!(chat_user_id = %chat_user_id, error = %err, "chat event handling failed");
        }
    }
    Ok(HttpResponse::Ok().finish())
}
