//! Weather code notification rules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Static rule describing whether a forecast weather code warrants a
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRule {
    /// Forecast weather code, e.g. `"300"` for rain.
    pub weather_code: String,
    pub description: String,
    pub is_notify_trigger: bool,
}

impl WeatherRule {
    /// Build a rule.
    pub fn new(
        weather_code: impl Into<String>,
        description: impl Into<String>,
        is_notify_trigger: bool,
    ) -> Self {
        Self {
            weather_code: weather_code.into(),
            description: description.into(),
            is_notify_trigger,
        }
    }
}
