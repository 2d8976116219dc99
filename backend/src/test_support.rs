//! Test utilities for the weather-bot crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Only compiled for tests or with the `test-support` feature.

pub mod areas;
mod recording;
pub mod users;

pub use recording::{
    MutableClock, RecordedReply, RecordingHistorySink, RecordingMessenger, RecordingSleeper,
};

/// Forecast document with one weather series for `class10_id`.
///
/// `time_defines` are emitted as given; `codes` become the area's
/// `weatherCodes`.
pub fn forecast_document(class10_id: &str, time_defines: &[&str], codes: &[&str]) -> Vec<u8> {
    serde_json::json!([
        {
            "publishingOffice": "気象庁",
            "timeSeries": [
                {
                    "timeDefines": time_defines,
                    "areas": [
                        {
                            "area": {"name": "fixture", "code": class10_id},
                            "weatherCodes": codes,
                        }
                    ]
                }
            ]
        }
    ])
    .to_string()
    .into_bytes()
}
