//! Weather rule evaluation and the time-window batch.
//!
//! `process_one` resolves a user's area, fetches the office forecast,
//! extracts class10 weather codes for today, evaluates them against the
//! rule table, and hands a history record to the configured sink. The batch
//! fans `process_one` out over every due user with bounded concurrency and
//! isolates per-user failures.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use futures_util::stream::{self, StreamExt};
use mockable::Clock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ports::{
    BatchSummary, BatchWindow, ForecastSource, ForecastSourceError, NotificationHistorySink,
    UserPersistenceError, UserRepository, WeatherBatchCommand, WeatherRuleRepository,
};
use super::{
    AreaHierarchyService, AreaLookupError, Error, ForecastParseError, NotificationHistory,
    NotifyTime, User, UserId, extract_weather_codes,
};

mod history_writer;

pub use history_writer::{HistoryRetrySleeper, HistoryWriterConfig, QueuedHistoryWriter, TokioSleeper};

/// Batch tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherEvaluationConfig {
    /// Users evaluated concurrently within one batch.
    pub batch_concurrency: usize,
    /// Zone used for "today" and for the default batch window.
    pub timezone: Tz,
}

impl Default for WeatherEvaluationConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 4,
            timezone: chrono_tz::Asia::Tokyo,
        }
    }
}

/// Why one user's evaluation was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherEvaluationError {
    #[error("invalid evaluation input: {message}")]
    InvalidInput { message: String },
    #[error("no area hierarchy for class20 id {class20_id}")]
    AreaNotFound { class20_id: String },
    #[error("forecast fetch failed: {0}")]
    FetchFailed(#[from] ForecastSourceError),
    #[error("forecast parse failed: {0}")]
    ParseFailed(#[from] ForecastParseError),
    #[error("persistence failed: {message}")]
    Persistence { message: String },
}

impl From<AreaLookupError> for WeatherEvaluationError {
    fn from(value: AreaLookupError) -> Self {
        match value {
            AreaLookupError::NotFound { id } => Self::AreaNotFound { class20_id: id },
            AreaLookupError::InvalidIdentifier(_) | AreaLookupError::InvalidLevel { .. } => {
                Self::InvalidInput {
                    message: value.to_string(),
                }
            }
            AreaLookupError::Repository(err) => Self::Persistence {
                message: err.to_string(),
            },
        }
    }
}

impl From<UserPersistenceError> for WeatherEvaluationError {
    fn from(value: UserPersistenceError) -> Self {
        Self::Persistence {
            message: value.to_string(),
        }
    }
}

impl From<WeatherEvaluationError> for Error {
    fn from(value: WeatherEvaluationError) -> Self {
        match value {
            WeatherEvaluationError::InvalidInput { .. } => Error::invalid_request(value.to_string()),
            WeatherEvaluationError::AreaNotFound { .. } => Error::not_found(value.to_string()),
            WeatherEvaluationError::FetchFailed(_) | WeatherEvaluationError::ParseFailed(_) => {
                Error::upstream_failure(value.to_string())
            }
            WeatherEvaluationError::Persistence { .. } => {
                Error::service_unavailable(value.to_string())
            }
        }
    }
}

/// Result of evaluating one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    pub user_id: UserId,
    pub notify: bool,
    pub weather_codes: Vec<String>,
    /// Identifier of the history record handed to the sink.
    pub history_id: Uuid,
}

/// Ports used by [`WeatherEvaluationService`].
pub struct WeatherEvaluationPorts {
    pub users: Arc<dyn UserRepository>,
    pub areas: AreaHierarchyService,
    pub rules: Arc<dyn WeatherRuleRepository>,
    pub forecasts: Arc<dyn ForecastSource>,
    pub history: Arc<dyn NotificationHistorySink>,
}

/// Domain service implementing evaluation and the batch trigger.
pub struct WeatherEvaluationService {
    users: Arc<dyn UserRepository>,
    areas: AreaHierarchyService,
    rules: Arc<dyn WeatherRuleRepository>,
    forecasts: Arc<dyn ForecastSource>,
    history: Arc<dyn NotificationHistorySink>,
    clock: Arc<dyn Clock>,
    config: WeatherEvaluationConfig,
}

impl WeatherEvaluationService {
    /// Build the service.
    pub fn new(
        ports: WeatherEvaluationPorts,
        clock: Arc<dyn Clock>,
        config: WeatherEvaluationConfig,
    ) -> Self {
        Self {
            users: ports.users,
            areas: ports.areas,
            rules: ports.rules,
            forecasts: ports.forecasts,
            history: ports.history,
            clock,
            config,
        }
    }

    /// Whether any code maps to a triggering rule.
    ///
    /// Codes are checked in order and evaluation stops at the first
    /// trigger. Missing rules and lookup failures count as non-triggering.
    pub async fn evaluate(&self, weather_codes: &[String]) -> bool {
        for code in weather_codes {
            match self.rules.find_by_code(code).await {
                Ok(Some(rule)) if rule.is_notify_trigger => return true,
                Ok(Some(_)) => {}
                Ok(None) => warn!(weather_code = %code, "no notification rule for weather code"),
                Err(err) => {
                    warn!(weather_code = %code, error = %err, "weather rule lookup failed");
                }
            }
        }
        false
    }

    /// Evaluate one user and submit a history record.
    ///
    /// Every successful call submits a fresh record; repeated calls are not
    /// deduplicated.
    pub async fn process_one(&self, user: &User) -> Result<EvaluationOutcome, WeatherEvaluationError> {
        let class20_id =
            user.selected_area_id
                .as_deref()
                .ok_or_else(|| WeatherEvaluationError::InvalidInput {
                    message: format!("user {} has no selected area", user.id),
                })?;
        let hierarchy = self.areas.resolve_by_leaf_id(class20_id).await?;

        let target_date = self.today();
        let body = self.forecasts.fetch_forecast(&hierarchy.office.id).await?;
        let extraction = extract_weather_codes(&body, &hierarchy.class10.id, target_date)?;
        if extraction.anomalies > 0 {
            warn!(
                office_id = %hierarchy.office.id,
                anomalies = extraction.anomalies,
                "forecast document had unexpected shapes"
            );
        }

        let notify = self.evaluate(&extraction.weather_codes).await;
        let record = NotificationHistory::record(
            user.id,
            notify,
            extraction.weather_codes.clone(),
            body,
            self.clock.utc(),
        );
        let history_id = record.id;
        self.history.submit(record);

        debug!(
            user_id = %user.id,
            class10_id = %hierarchy.class10.id,
            codes = extraction.weather_codes.len(),
            notify,
            "user evaluated"
        );
        Ok(EvaluationOutcome {
            user_id: user.id,
            notify,
            weather_codes: extraction.weather_codes,
            history_id,
        })
    }

    /// Evaluate every user whose notify time lies in `[start, end)`.
    ///
    /// Only listing due users can fail the batch.
    pub async fn process_time_range(
        &self,
        start: NotifyTime,
        end: NotifyTime,
    ) -> Result<BatchSummary, WeatherEvaluationError> {
        let users = self.users.find_due_in_window(start, end).await?;
        let due = users.len();

        let results: Vec<bool> = stream::iter(users)
            .map(|user| async move {
                match self.process_one(&user).await {
                    Ok(_) => true,
                    Err(err) => {
                        error!(user_id = %user.id, error = %err, "weather evaluation failed for user");
                        false
                    }
                }
            })
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let succeeded = results.iter().filter(|ok| **ok).count();
        let summary = BatchSummary {
            window: BatchWindow::new(start, end),
            due,
            succeeded,
            failed: due - succeeded,
        };
        info!(
            start = %start,
            end = %end,
            due = summary.due,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "weather batch completed"
        );
        Ok(summary)
    }

    /// The hour ending at `now` in the configured zone, to the minute.
    pub fn default_window(&self, now: DateTime<Utc>) -> BatchWindow {
        let local = |at: DateTime<Utc>| {
            NotifyTime::new(at.with_timezone(&self.config.timezone).time())
        };
        BatchWindow::new(local(now - TimeDelta::hours(1)), local(now))
    }

    fn today(&self) -> NaiveDate {
        self.clock
            .utc()
            .with_timezone(&self.config.timezone)
            .date_naive()
    }
}

#[async_trait]
impl WeatherBatchCommand for WeatherEvaluationService {
    async fn run(&self, window: Option<BatchWindow>) -> Result<BatchSummary, Error> {
        let window = window.unwrap_or_else(|| self.default_window(self.clock.utc()));
        self.process_time_range(window.start, window.end)
            .await
            .map_err(Error::from)
    }
}
