//! Driven port for the weather rule reference table.

use async_trait::async_trait;

use crate::domain::WeatherRule;

use super::define_port_error;

define_port_error! {
    /// Errors raised by weather rule repository adapters.
    pub enum WeatherRuleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "weather rule repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "weather rule repository query failed: {message}",
    }
}

/// Lookup of notification rules by weather code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherRuleRepository: Send + Sync {
    /// Rule for `weather_code`; `None` when no rule exists.
    async fn find_by_code(
        &self,
        weather_code: &str,
    ) -> Result<Option<WeatherRule>, WeatherRuleRepositoryError>;
}

/// Fixture repository with no rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureWeatherRuleRepository;

#[async_trait]
impl WeatherRuleRepository for FixtureWeatherRuleRepository {
    async fn find_by_code(
        &self,
        _weather_code: &str,
    ) -> Result<Option<WeatherRule>, WeatherRuleRepositoryError> {
        Ok(None)
    }
}
