//! Driving port for area hierarchy lookups.

use async_trait::async_trait;

use crate::domain::{Error, HierarchyArea};

/// Use-case port for resolving a class20 leaf to its full hierarchy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AreaQuery: Send + Sync {
    /// Resolve `class20_id`; malformed ids are `invalid_request`, broken or
    /// unknown chains `not_found`.
    async fn hierarchy(&self, class20_id: &str) -> Result<HierarchyArea, Error>;
}

/// Fixture query that knows no areas.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAreaQuery;

#[async_trait]
impl AreaQuery for FixtureAreaQuery {
    async fn hierarchy(&self, class20_id: &str) -> Result<HierarchyArea, Error> {
        Err(Error::not_found(format!(
            "no complete hierarchy for class20 id {class20_id}"
        )))
    }
}
