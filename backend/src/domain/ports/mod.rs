//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, forecast source, chat messenger, history
//! sink) are implemented by outbound adapters. Driving ports (area query,
//! chat event handler, weather batch, user administration) are implemented
//! by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod area_query;
mod area_repository;
mod chat_event_handler;
mod chat_messenger;
mod forecast_source;
mod message_catalog;
mod notification_history_repository;
mod user_administration;
mod user_repository;
mod weather_batch_command;
mod weather_rule_repository;

#[cfg(test)]
pub use area_query::MockAreaQuery;
pub use area_query::{AreaQuery, FixtureAreaQuery};
#[cfg(test)]
pub use area_repository::MockAreaRepository;
pub use area_repository::{AreaRepository, AreaRepositoryError, FixtureAreaRepository};
#[cfg(test)]
pub use chat_event_handler::MockChatEventHandler;
pub use chat_event_handler::{ChatEvent, ChatEventHandler, FixtureChatEventHandler};
#[cfg(test)]
pub use chat_messenger::MockChatMessenger;
pub use chat_messenger::{
    ChatMessenger, ChatMessengerError, FixtureChatMessenger, MAX_QUICK_REPLIES, OutgoingMessage,
    QuickReplyOption, ReplyToken,
};
#[cfg(test)]
pub use forecast_source::MockForecastSource;
pub use forecast_source::{FixtureForecastSource, ForecastSource, ForecastSourceError};
pub use message_catalog::MessageCatalog;
#[cfg(test)]
pub use notification_history_repository::{
    MockNotificationHistoryRepository, MockNotificationHistorySink,
};
pub use notification_history_repository::{
    FixtureNotificationHistorySink, NotificationHistoryRepository,
    NotificationHistoryRepositoryError, NotificationHistorySink,
};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::{
    CreateUserRequest, FixtureUserAdministration, UpdateUserRequest, UserAdministration,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository, window_contains};
#[cfg(test)]
pub use weather_batch_command::MockWeatherBatchCommand;
pub use weather_batch_command::{
    BatchSummary, BatchWindow, FixtureWeatherBatchCommand, WeatherBatchCommand,
};
#[cfg(test)]
pub use weather_rule_repository::MockWeatherRuleRepository;
pub use weather_rule_repository::{
    FixtureWeatherRuleRepository, WeatherRuleRepository, WeatherRuleRepositoryError,
};

#[cfg(test)]
mod tests;
