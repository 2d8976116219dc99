//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer and the
//! domain types they exchange. The document backs Swagger UI in debug builds
//! and is printed by `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::domain::ports::{BatchSummary, BatchWindow, CreateUserRequest, UpdateUserRequest};
use crate::domain::{
    AreaLevel, AreaNode, ConversationStatus, Error, ErrorCode, HierarchyArea, User,
};
use crate::inbound::http::weather::ProcessWeatherResponse;

/// OpenAPI document for the bot's HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather notification bot API",
        description = "Chat webhook, area lookup, user administration and the weather batch trigger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::webhook::receive_webhook,
        crate::inbound::http::areas::get_area_hierarchy,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::get_user_by_chat_id,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::weather::process_weather,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        ConversationStatus,
        AreaLevel,
        AreaNode,
        HierarchyArea,
        Error,
        ErrorCode,
        CreateUserRequest,
        UpdateUserRequest,
        ProcessWeatherResponse,
        BatchSummary,
        BatchWindow,
    )),
    tags(
        (name = "webhook", description = "Chat platform event delivery"),
        (name = "areas", description = "Forecast area hierarchy"),
        (name = "users", description = "Administrative user management"),
        (name = "weather", description = "Forecast evaluation batch"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
