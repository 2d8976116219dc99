//! Weather notification bot library modules.
//!
//! The crate follows a hexagonal layout: [`domain`] holds types, services and
//! port traits; [`inbound`] adapts HTTP requests onto driving ports;
//! [`outbound`] implements driven ports against PostgreSQL, the forecast
//! service and the chat platform.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
