//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed entities for areas, users, rules and
//! notification history, the services that implement the registration
//! conversation and the weather batch, and the port traits adapters plug
//! into. Nothing here depends on actix, Diesel or reqwest.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - AreaHierarchyService: resolves class20 leaves and names.
//! - ConversationService: drives the chat registration flow.
//! - WeatherEvaluationService: evaluates forecasts and runs batches.
//! - UserService: administrative user management.

pub mod area;
pub mod area_service;
pub mod conversation;
pub mod error;
pub mod forecast;
pub mod localization;
pub mod notification_history;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod weather_evaluation;
pub mod weather_rule;

pub use self::area::{AreaIdValidationError, AreaLevel, AreaNode, Class20Id, HierarchyArea};
pub use self::area_service::{AreaHierarchyService, AreaLookupError};
pub use self::conversation::{ConversationError, ConversationService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::forecast::{ForecastExtraction, ForecastParseError, extract_weather_codes};
pub use self::localization::{MessageKey, StaticMessageCatalog};
pub use self::notification_history::NotificationHistory;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ChatUserId, ConversationStatus, NotifyTime, StatusTransitionError, User, UserId,
    UserValidationError,
};
pub use self::user_service::{UserService, UserServiceError};
pub use self::weather_evaluation::{
    EvaluationOutcome, HistoryWriterConfig, QueuedHistoryWriter, WeatherEvaluationConfig,
    WeatherEvaluationError, WeatherEvaluationPorts, WeatherEvaluationService,
};
pub use self::weather_rule::WeatherRule;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use weather_bot::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such user"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
