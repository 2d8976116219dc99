//! Driving port for the externally triggered weather batch.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, NotifyTime};

/// Half-open time-of-day window `[start, end)`; wraps midnight when
/// `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchWindow {
    pub start: NotifyTime,
    pub end: NotifyTime,
}

impl BatchWindow {
    /// Build a window.
    #[must_use]
    pub fn new(start: NotifyTime, end: NotifyTime) -> Self {
        Self { start, end }
    }
}

/// Counts reported by one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchSummary {
    pub window: BatchWindow,
    /// Users whose notify time fell in the window.
    pub due: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Use-case port for running one evaluation batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherBatchCommand: Send + Sync {
    /// Evaluate every user due in `window`, or in the hour preceding now
    /// when `window` is `None`.
    ///
    /// Per-user failures are counted, not returned. Only a failure to list
    /// due users is an error.
    async fn run(&self, window: Option<BatchWindow>) -> Result<BatchSummary, Error>;
}

/// Fixture command reporting an empty batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWeatherBatchCommand;

#[async_trait]
impl WeatherBatchCommand for FixtureWeatherBatchCommand {
    async fn run(&self, window: Option<BatchWindow>) -> Result<BatchSummary, Error> {
        let window = match window {
            Some(window) => window,
            None => {
                let midnight = NotifyTime::new(chrono::NaiveTime::MIN);
                BatchWindow::new(midnight, midnight)
            }
        };
        Ok(BatchSummary {
            window,
            due: 0,
            succeeded: 0,
            failed: 0,
        })
    }
}
