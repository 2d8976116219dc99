//! Area hierarchy resolution over the [`AreaRepository`] port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::ports::{AreaQuery, AreaRepository, AreaRepositoryError};
use super::{AreaIdValidationError, AreaLevel, AreaNode, Class20Id, Error, HierarchyArea};

/// Failures while resolving areas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AreaLookupError {
    #[error(transparent)]
    InvalidIdentifier(#[from] AreaIdValidationError),
    #[error("no complete hierarchy for class20 id {id}")]
    NotFound { id: String },
    #[error("{level} nodes have no children to list")]
    InvalidLevel { level: AreaLevel },
    #[error(transparent)]
    Repository(#[from] AreaRepositoryError),
}

impl From<AreaLookupError> for Error {
    fn from(value: AreaLookupError) -> Self {
        match value {
            AreaLookupError::InvalidIdentifier(_) | AreaLookupError::InvalidLevel { .. } => {
                Error::invalid_request(value.to_string())
            }
            AreaLookupError::NotFound { .. } => Error::not_found(value.to_string()),
            AreaLookupError::Repository(AreaRepositoryError::Connection { .. }) => {
                Error::service_unavailable("area store unavailable")
            }
            AreaLookupError::Repository(_) => Error::internal(value.to_string()),
        }
    }
}

/// Resolves leaf ids and names against the five-level hierarchy.
#[derive(Clone)]
pub struct AreaHierarchyService {
    repository: Arc<dyn AreaRepository>,
}

impl AreaHierarchyService {
    /// Build the service.
    pub fn new(repository: Arc<dyn AreaRepository>) -> Self {
        Self { repository }
    }

    /// Resolve a class20 id to its full ancestor chain.
    ///
    /// The id is validated before any storage access. A leaf whose chain is
    /// broken anywhere is reported as not found.
    pub async fn resolve_by_leaf_id(&self, raw_id: &str) -> Result<HierarchyArea, AreaLookupError> {
        let id = Class20Id::parse(raw_id)?;
        self.repository
            .find_hierarchy(&id)
            .await?
            .ok_or_else(|| AreaLookupError::NotFound {
                id: id.to_string(),
            })
    }

    /// Full hierarchies for every class20 leaf whose name contains `text`.
    ///
    /// Matches keep storage order and are not deduplicated. Leaves that no
    /// longer resolve are skipped.
    pub async fn search_by_name(&self, text: &str) -> Result<Vec<HierarchyArea>, AreaLookupError> {
        let query = text.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let leaves = self.repository.find_class20_by_name(query).await?;
        let mut hierarchies = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            match self.resolve_by_leaf_id(&leaf.id).await {
                Ok(hierarchy) => hierarchies.push(hierarchy),
                Err(AreaLookupError::NotFound { .. } | AreaLookupError::InvalidIdentifier(_)) => {
                    warn!(class20_id = %leaf.id, "name match has no complete hierarchy; skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(hierarchies)
    }

    /// First office whose name contains `text`.
    ///
    /// Ties resolve to whichever row storage returns first.
    pub async fn find_office_by_name(&self, text: &str) -> Result<Option<AreaNode>, AreaLookupError> {
        let query = text.trim();
        if query.is_empty() {
            return Ok(None);
        }
        Ok(self.repository.find_office_by_name(query).await?)
    }

    /// Children of `parent_id`, where `parent_level` is office, class10 or
    /// class15.
    pub async fn children_of(
        &self,
        parent_level: AreaLevel,
        parent_id: &str,
    ) -> Result<Vec<AreaNode>, AreaLookupError> {
        match parent_level {
            AreaLevel::Office | AreaLevel::Class10 | AreaLevel::Class15 => Ok(self
                .repository
                .find_children(parent_level, parent_id)
                .await?),
            AreaLevel::Center | AreaLevel::Class20 => {
                Err(AreaLookupError::InvalidLevel {
                    level: parent_level,
                })
            }
        }
    }
}

#[async_trait]
impl AreaQuery for AreaHierarchyService {
    async fn hierarchy(&self, class20_id: &str) -> Result<HierarchyArea, Error> {
        self.resolve_by_leaf_id(class20_id).await.map_err(Error::from)
    }
}
