//! Builders wiring repositories and adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;

use weather_bot::domain::ports::{ChatMessenger, ForecastSource, UserRepository};
use weather_bot::domain::{
    AreaHierarchyService, ConversationService, QueuedHistoryWriter, StaticMessageCatalog,
    UserService, WeatherEvaluationPorts, WeatherEvaluationService,
};
use weather_bot::inbound::http::state::{HttpState, HttpStatePorts};
use weather_bot::outbound::jma::JmaForecastSource;
use weather_bot::outbound::line::LineReplyClient;
use weather_bot::outbound::persistence::{
    DbPool, DieselAreaRepository, DieselNotificationHistoryRepository, DieselUserRepository,
    DieselWeatherRuleRepository,
};

use super::ServerConfig;

/// Ports for the HTTP state plus the history worker, when one was spawned.
pub(super) struct WiredPorts {
    pub ports: HttpStatePorts,
    pub history_worker: Option<JoinHandle<()>>,
}

/// Use real services when a pool is available, otherwise fixture ports.
fn select_ports<Pool>(
    pool: Option<&Pool>,
    make_ports: impl FnOnce(&Pool) -> std::io::Result<WiredPorts>,
) -> std::io::Result<WiredPorts> {
    match pool {
        Some(pool) => make_ports(pool),
        None => Ok(WiredPorts {
            ports: HttpStatePorts::default(),
            history_worker: None,
        }),
    }
}

fn build_outbound(
    config: &ServerConfig,
) -> std::io::Result<(Arc<dyn ForecastSource>, Arc<dyn ChatMessenger>)> {
    let outbound = &config.outbound;
    let forecasts = JmaForecastSource::new(outbound.forecast_base_url.clone(), outbound.timeout)
        .map_err(|err| std::io::Error::other(format!("forecast client: {err}")))?;
    let messenger = LineReplyClient::new(
        &outbound.line_api_base_url,
        outbound.line_access_token.clone(),
        outbound.timeout,
    )
    .map_err(|err| std::io::Error::other(format!("reply client: {err}")))?;
    Ok((Arc::new(forecasts), Arc::new(messenger)))
}

/// Wire every service against PostgreSQL and the live HTTP adapters.
///
/// Must run inside a Tokio runtime: the history worker is spawned here.
fn build_db_ports(config: &ServerConfig, pool: &DbPool) -> std::io::Result<WiredPorts> {
    let (forecasts, messenger) = build_outbound(config)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
    let areas = AreaHierarchyService::new(Arc::new(DieselAreaRepository::new(pool.clone())));

    let (history, history_worker) = QueuedHistoryWriter::spawn(
        Arc::new(DieselNotificationHistoryRepository::new(pool.clone())),
        config.history.clone(),
    );

    let conversation = ConversationService::new(
        users.clone(),
        areas.clone(),
        messenger,
        Arc::new(StaticMessageCatalog::japanese()),
        clock.clone(),
    );
    let evaluation = WeatherEvaluationService::new(
        WeatherEvaluationPorts {
            users: users.clone(),
            areas: areas.clone(),
            rules: Arc::new(DieselWeatherRuleRepository::new(pool.clone())),
            forecasts,
            history: Arc::new(history),
        },
        clock.clone(),
        config.evaluation.clone(),
    );
    let administration = UserService::new(users, areas.clone(), clock);

    Ok(WiredPorts {
        ports: HttpStatePorts {
            areas: Arc::new(areas),
            chat_events: Arc::new(conversation),
            weather_batch: Arc::new(evaluation),
            users: Arc::new(administration),
        },
        history_worker: Some(history_worker),
    })
}

/// Build the shared HTTP state.
pub(super) fn build_http_state(
    config: &ServerConfig,
) -> std::io::Result<(web::Data<HttpState>, Option<JoinHandle<()>>)> {
    let WiredPorts {
        ports,
        history_worker,
    } = select_ports(config.db_pool.as_ref(), |pool| build_db_ports(config, pool))?;
    let state = HttpState::new(ports, config.channel_secret.clone());
    Ok((web::Data::new(state), history_worker))
}
