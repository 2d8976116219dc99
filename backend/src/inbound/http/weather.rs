//! Batch trigger for the weather evaluation run.
//!
//! ```text
//! GET /api/v1/process_weather?start=0800&end=0900
//! GET /api/v1/process_weather
//! ```
//!
//! Without parameters the batch covers the hour preceding now. Times are
//! `HHMM` in the configured local timezone.

use actix_web::{get, web};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{BatchSummary, BatchWindow};
use crate::domain::{Error, NotifyTime};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters for `GET /api/v1/process_weather`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProcessWeatherQuery {
    /// Inclusive window start, `HHMM`.
    pub start: Option<String>,
    /// Exclusive window end, `HHMM`.
    pub end: Option<String>,
}

/// Result of one batch run.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessWeatherResponse {
    #[schema(example = "Weather processing completed")]
    pub message: &'static str,
    pub due: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<BatchSummary> for ProcessWeatherResponse {
    fn from(summary: BatchSummary) -> Self {
        Self {
            message: "Weather processing completed",
            due: summary.due,
            succeeded: summary.succeeded,
            failed: summary.failed,
        }
    }
}

fn parse_hhmm(field: &'static str, raw: &str) -> Result<NotifyTime, Error> {
    NaiveTime::parse_from_str(raw, "%H%M")
        .map(NotifyTime::new)
        .map_err(|_| {
            Error::invalid_request(format!("invalid {field} time format"))
                .with_details(json!({ "field": field, "value": raw, "expected": "HHMM" }))
        })
}

fn parse_window(query: ProcessWeatherQuery) -> Result<Option<BatchWindow>, Error> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    match (non_empty(query.start), non_empty(query.end)) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => Ok(Some(BatchWindow::new(
            parse_hhmm("start", start.trim())?,
            parse_hhmm("end", end.trim())?,
        ))),
        _ => Err(Error::invalid_request("start and end must be given together")
            .with_details(json!({ "fields": ["start", "end"] }))),
    }
}

/// Evaluate every user due in the window.
#[utoipa::path(
    get,
    path = "/api/v1/process_weather",
    params(ProcessWeatherQuery),
    responses(
        (status = 200, description = "Batch finished", body = ProcessWeatherResponse),
        (status = 400, description = "Invalid window", body = Error),
        (status = 503, description = "User store unavailable", body = Error)
    ),
    tags = ["weather"],
    operation_id = "processWeather"
)]
#[get("/process_weather")]
pub async fn process_weather(
    state: web::Data<HttpState>,
    query: web::Query<ProcessWeatherQuery>,
) -> ApiResult<web::Json<ProcessWeatherResponse>> {
    let window = parse_window(query.into_inner())?;
    let summary = state.weather_batch.run(window).await?;
    Ok(web::Json(summary.into()))
}
