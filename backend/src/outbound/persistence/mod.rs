//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the area, user, weather rule and
//! notification history ports, backed by PostgreSQL through `diesel-async`
//! and a `bb8` connection pool.
//!
//! - Repository implementations only translate between Diesel rows and
//!   domain types. No conversation or evaluation logic lives here.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - Every database failure is mapped to the owning port's error type.
//!
//! # Example
//!
//! ```ignore
//! use weather_bot::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/weather")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_area_repository;
mod diesel_basic_error_mapping;
mod diesel_notification_history_repository;
mod diesel_user_repository;
mod diesel_weather_rule_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_area_repository::DieselAreaRepository;
pub use diesel_notification_history_repository::DieselNotificationHistoryRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_weather_rule_repository::DieselWeatherRuleRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
