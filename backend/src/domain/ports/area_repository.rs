//! Driven port for the five-level area hierarchy tables.

use async_trait::async_trait;

use crate::domain::{AreaLevel, AreaNode, Class20Id, HierarchyArea};

use super::define_port_error;

define_port_error! {
    /// Errors raised by area repository adapters.
    pub enum AreaRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "area repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "area repository query failed: {message}",
        /// The requested level has no parent/child relation for this query.
        UnsupportedLevel { level: String } => "children are not stored under level {level}",
    }
}

/// Read-only access to the area hierarchy.
///
/// Name queries are substring matches. Results come back in storage order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AreaRepository: Send + Sync {
    /// Join a leaf to its full ancestor chain.
    ///
    /// Returns `None` when the leaf or any ancestor link is missing.
    async fn find_hierarchy(
        &self,
        class20_id: &Class20Id,
    ) -> Result<Option<HierarchyArea>, AreaRepositoryError>;

    /// Class20 leaves whose name contains `name`.
    async fn find_class20_by_name(&self, name: &str) -> Result<Vec<AreaNode>, AreaRepositoryError>;

    /// First office whose name contains `name`.
    async fn find_office_by_name(&self, name: &str)
    -> Result<Option<AreaNode>, AreaRepositoryError>;

    /// Direct children of `parent_id`, where `parent_level` is the level of
    /// the parent (office, class10 or class15).
    async fn find_children(
        &self,
        parent_level: AreaLevel,
        parent_id: &str,
    ) -> Result<Vec<AreaNode>, AreaRepositoryError>;
}

/// Fixture repository with no areas.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAreaRepository;

#[async_trait]
impl AreaRepository for FixtureAreaRepository {
    async fn find_hierarchy(
        &self,
        _class20_id: &Class20Id,
    ) -> Result<Option<HierarchyArea>, AreaRepositoryError> {
        Ok(None)
    }

    async fn find_class20_by_name(
        &self,
        _name: &str,
    ) -> Result<Vec<AreaNode>, AreaRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_office_by_name(
        &self,
        _name: &str,
    ) -> Result<Option<AreaNode>, AreaRepositoryError> {
        Ok(None)
    }

    async fn find_children(
        &self,
        _parent_level: AreaLevel,
        _parent_id: &str,
    ) -> Result<Vec<AreaNode>, AreaRepositoryError> {
        Ok(Vec::new())
    }
}
