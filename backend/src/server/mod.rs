//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{OutboundConfig, ServerConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tokio::task::JoinHandle;

use weather_bot::Trace;
#[cfg(debug_assertions)]
use weather_bot::doc::ApiDoc;
use weather_bot::inbound::http::areas::get_area_hierarchy;
use weather_bot::inbound::http::health::{HealthState, live, ready};
use weather_bot::inbound::http::json_config;
use weather_bot::inbound::http::state::HttpState;
use weather_bot::inbound::http::users::{
    create_user, delete_user, get_user, get_user_by_chat_id, update_user,
};
use weather_bot::inbound::http::weather::process_weather;
use weather_bot::inbound::http::webhook::receive_webhook;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(process_weather)
        .service(get_area_hierarchy)
        .service(create_user)
        .service(get_user_by_chat_id)
        .service(get_user)
        .service(update_user)
        .service(delete_user);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(receive_webhook)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// A bound server and the background history worker it feeds.
pub struct RunningServer {
    pub server: Server,
    pub history_worker: Option<JoinHandle<()>>,
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is flipped once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter construction, binding the
/// socket, or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let server_health_state = health_state.clone();
    let (http_state, history_worker) = build_http_state(&config)?;

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr())?
        .run();

    health_state.mark_ready();
    Ok(RunningServer {
        server,
        history_worker,
    })
}
