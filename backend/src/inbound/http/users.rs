//! User administration handlers.
//!
//! ```text
//! POST   /api/v1/users {"chatUserId":"U1","selectedAreaId":"1310400","notifyTime":"07:30"}
//! GET    /api/v1/users/{id}
//! GET    /api/v1/users/chat/{chat_user_id}
//! PUT    /api/v1/users/{id} {"notifyTime":"21:00","revision":1}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;

use crate::domain::ports::{CreateUserRequest, UpdateUserRequest};
use crate::domain::{ChatUserId, Error, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_uuid" }))
    })
}

fn parse_chat_user_id(raw: String) -> Result<ChatUserId, Error> {
    ChatUserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "chatUserId", "code": "empty_chat_user_id" }))
    })
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Chat user already registered", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.create_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Fetch a user by internal id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path.into_inner())?;
    Ok(web::Json(state.users.get_user(&id).await?))
}

/// Fetch a user by chat platform id.
#[utoipa::path(
    get,
    path = "/api/v1/users/chat/{chat_user_id}",
    params(("chat_user_id" = String, Path, description = "Chat platform user id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserByChatId"
)]
#[get("/users/chat/{chat_user_id}")]
pub async fn get_user_by_chat_id(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let chat_user_id = parse_chat_user_id(path.into_inner())?;
    Ok(web::Json(
        state.users.get_user_by_chat_id(&chat_user_id).await?,
    ))
}

/// Update area, notify time or activation.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User UUID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Stale revision", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path.into_inner())?;
    Ok(web::Json(
        state.users.update_user(&id, payload.into_inner()).await?,
    ))
}

/// Remove a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    state.users.delete_user(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
