//! PostgreSQL-backed `AreaRepository` over the five area tables.
//!
//! Each level lives in its own table keyed by the official area code. The
//! hierarchy lookup is a single four-way join from the class20 leaf up to the
//! center, so a missing link anywhere yields no row at all.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AreaRepository, AreaRepositoryError};
use crate::domain::{AreaLevel, AreaNode, Class20Id, HierarchyArea};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CenterRow, Class10Row, Class15Row, Class20Row, OfficeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{area_centers, area_class10, area_class15, area_class20, area_offices};

/// Diesel-backed implementation of the `AreaRepository` port.
#[derive(Clone)]
pub struct DieselAreaRepository {
    pool: DbPool,
}

impl DieselAreaRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AreaRepositoryError {
    map_basic_pool_error(error, AreaRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AreaRepositoryError {
    map_basic_diesel_error(
        error,
        AreaRepositoryError::query,
        AreaRepositoryError::connection,
    )
}

/// Build a `LIKE` pattern matching `text` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl From<CenterRow> for AreaNode {
    fn from(row: CenterRow) -> Self {
        AreaNode::new(row.id, row.name, row.en_name, row.parent_id)
    }
}

macro_rules! node_from_row {
    ($($row:ty),+) => {
        $(
            impl From<$row> for AreaNode {
                fn from(row: $row) -> Self {
                    AreaNode::new(row.id, row.name, row.en_name, Some(row.parent_id))
                }
            }
        )+
    };
}

node_from_row!(OfficeRow, Class10Row, Class15Row, Class20Row);

type HierarchyRow = (Class20Row, Class15Row, Class10Row, OfficeRow, CenterRow);

fn row_to_hierarchy((class20, class15, class10, office, center): HierarchyRow) -> HierarchyArea {
    HierarchyArea {
        center: center.into(),
        office: office.into(),
        class10: class10.into(),
        class15: class15.into(),
        class20: class20.into(),
    }
}

#[async_trait]
impl AreaRepository for DieselAreaRepository {
    async fn find_hierarchy(
        &self,
        class20_id: &Class20Id,
    ) -> Result<Option<HierarchyArea>, AreaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<HierarchyRow> = area_class20::table
            .inner_join(area_class15::table.on(area_class20::parent_id.eq(area_class15::id)))
            .inner_join(area_class10::table.on(area_class15::parent_id.eq(area_class10::id)))
            .inner_join(area_offices::table.on(area_class10::parent_id.eq(area_offices::id)))
            .inner_join(area_centers::table.on(area_offices::parent_id.eq(area_centers::id)))
            .filter(area_class20::id.eq(class20_id.as_str()))
            .select((
                Class20Row::as_select(),
                Class15Row::as_select(),
                Class10Row::as_select(),
                OfficeRow::as_select(),
                CenterRow::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_hierarchy))
    }

    async fn find_class20_by_name(&self, name: &str) -> Result<Vec<AreaNode>, AreaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<Class20Row> = area_class20::table
            .filter(area_class20::name.like(contains_pattern(name)))
            .order(area_class20::id.asc())
            .select(Class20Row::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(AreaNode::from).collect())
    }

    async fn find_office_by_name(
        &self,
        name: &str,
    ) -> Result<Option<AreaNode>, AreaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OfficeRow> = area_offices::table
            .filter(area_offices::name.like(contains_pattern(name)))
            .order(area_offices::id.asc())
            .select(OfficeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(AreaNode::from))
    }

    async fn find_children(
        &self,
        parent_level: AreaLevel,
        parent_id: &str,
    ) -> Result<Vec<AreaNode>, AreaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let nodes: Result<Vec<AreaNode>, diesel::result::Error> = match parent_level {
            AreaLevel::Center => area_offices::table
                .filter(area_offices::parent_id.eq(parent_id))
                .order(area_offices::id.asc())
                .select(OfficeRow::as_select())
                .load::<OfficeRow>(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(AreaNode::from).collect()),
            AreaLevel::Office => area_class10::table
                .filter(area_class10::parent_id.eq(parent_id))
                .order(area_class10::id.asc())
                .select(Class10Row::as_select())
                .load::<Class10Row>(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(AreaNode::from).collect()),
            AreaLevel::Class10 => area_class15::table
                .filter(area_class15::parent_id.eq(parent_id))
                .order(area_class15::id.asc())
                .select(Class15Row::as_select())
                .load::<Class15Row>(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(AreaNode::from).collect()),
            AreaLevel::Class15 => area_class20::table
                .filter(area_class20::parent_id.eq(parent_id))
                .order(area_class20::id.asc())
                .select(Class20Row::as_select())
                .load::<Class20Row>(&mut conn)
                .await
                .map(|rows| rows.into_iter().map(AreaNode::from).collect()),
            AreaLevel::Class20 => {
                return Err(AreaRepositoryError::unsupported_level(
                    parent_level.as_str(),
                ));
            }
        };

        nodes.map_err(map_diesel_error)
    }
}
