//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **jma**: forecast documents over HTTP
//! - **line**: chat replies through the LINE Messaging API
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

mod body_preview;
pub mod jma;
pub mod line;
pub mod persistence;
