//! Bot entry-point: parses the command, loads settings, and either applies
//! migrations or serves the webhook and batch endpoints.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::ffi::OsString;
use std::time::Duration;

use actix_web::web;
use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{OutboundConfig, RunningServer, ServerConfig, create_server};
use weather_bot::domain::{HistoryWriterConfig, WeatherEvaluationConfig};
use weather_bot::inbound::http::health::HealthState;
use weather_bot::inbound::http::state::ChannelSecret;
use weather_bot::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use weather_bot::settings::AppSettings;

const HISTORY_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// `weather-bot` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "weather-bot",
    about = "Chat bot that registers areas and evaluates daily forecasts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    // Settings come from the environment and config file only; the command
    // line belongs to clap.
    let settings = AppSettings::load_from_iter([OsString::from("weather-bot")])
        .wrap_err("failed to load settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => migrate(&settings).await,
        Command::Serve => serve(&settings).await,
    }
}

async fn migrate(settings: &AppSettings) -> Result<()> {
    let applied = run_pending_migrations(settings.database_url()?).await?;
    info!(versions = ?applied, "migrations complete");
    Ok(())
}

fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let outbound = OutboundConfig::new(
        settings.forecast_base_url()?,
        settings.line_api_base_url()?,
        settings.line_channel_access_token()?,
        settings.forecast_timeout(),
    );
    Ok(ServerConfig::new(
        settings.bind_addr()?,
        ChannelSecret::new(settings.line_channel_secret()?),
        outbound,
    )
    .with_evaluation(WeatherEvaluationConfig {
        batch_concurrency: settings.batch_concurrency.max(1),
        timezone: settings.timezone()?,
    })
    .with_history_writer(HistoryWriterConfig {
        capacity: settings.history_queue_capacity,
        max_attempts: settings.history_max_attempts.max(1),
        ..HistoryWriterConfig::default()
    }))
}

async fn serve(settings: &AppSettings) -> Result<()> {
    let pool_config =
        PoolConfig::new(settings.database_url()?).with_max_size(settings.db_pool_max_size);
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to create database pool")?;
    let config = server_config(settings)?.with_db_pool(pool);
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let RunningServer {
        server,
        history_worker,
    } = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(%bind_addr, "server listening");

    server.await.wrap_err("server terminated with an error")?;

    // The worker exits once every writer handle is dropped with the app
    // factory; bound the wait so shutdown cannot hang on it.
    if let Some(worker) = history_worker {
        match tokio::time::timeout(HISTORY_DRAIN_TIMEOUT, worker).await {
            Ok(Ok(())) => info!("history queue drained"),
            Ok(Err(err)) => warn!(error = %err, "history worker ended abnormally"),
            Err(_) => warn!("history queue not drained before shutdown"),
        }
    }
    Ok(())
}
