//! PostgreSQL-backed `WeatherRuleRepository` reading the seeded rule table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::WeatherRule;
use crate::domain::ports::{WeatherRuleRepository, WeatherRuleRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::WeatherRuleRow;
use super::pool::{DbPool, PoolError};
use super::schema::weather_notification_rules;

/// Diesel-backed implementation of the `WeatherRuleRepository` port.
#[derive(Clone)]
pub struct DieselWeatherRuleRepository {
    pool: DbPool,
}

impl DieselWeatherRuleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WeatherRuleRepositoryError {
    map_basic_pool_error(error, WeatherRuleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WeatherRuleRepositoryError {
    map_basic_diesel_error(
        error,
        WeatherRuleRepositoryError::query,
        WeatherRuleRepositoryError::connection,
    )
}

impl From<WeatherRuleRow> for WeatherRule {
    fn from(row: WeatherRuleRow) -> Self {
        WeatherRule::new(row.weather_code, row.weather_description, row.is_notify_trigger)
    }
}

#[async_trait]
impl WeatherRuleRepository for DieselWeatherRuleRepository {
    async fn find_by_code(
        &self,
        weather_code: &str,
    ) -> Result<Option<WeatherRule>, WeatherRuleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<WeatherRuleRow> = weather_notification_rules::table
            .filter(weather_notification_rules::weather_code.eq(weather_code))
            .select(WeatherRuleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(WeatherRule::from))
    }
}
