//! HTTP inbound adapter exposing the webhook and REST endpoints.

pub mod areas;
pub mod error;
pub mod health;
pub mod state;
pub mod users;
pub mod weather;
pub mod webhook;

pub use error::{ApiResult, json_config};
