//! Area fixtures and an in-memory area repository.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{AreaRepository, AreaRepositoryError};
use crate::domain::{AreaLevel, AreaNode, Class20Id, HierarchyArea};

/// Node with an empty English name.
pub fn node(id: &str, name: &str, parent_id: Option<&str>) -> AreaNode {
    AreaNode::new(id, name, "", parent_id.map(str::to_owned))
}

/// 関東甲信 > 東京都 > 東京地方 > 23区西部 > 新宿区.
pub fn shinjuku_hierarchy() -> HierarchyArea {
    HierarchyArea {
        center: node("010300", "関東甲信地方", None),
        office: node("130000", "東京都", Some("010300")),
        class10: node("130010", "東京地方", Some("130000")),
        class15: node("130011", "23区西部", Some("130010")),
        class20: node("1310400", "新宿区", Some("130011")),
    }
}

/// 近畿 > 大阪府 > 大阪府 > 大阪市 > 大阪市.
pub fn osaka_hierarchy() -> HierarchyArea {
    HierarchyArea {
        center: node("010600", "近畿地方", None),
        office: node("270000", "大阪府", Some("010600")),
        class10: node("270000", "大阪府", Some("270000")),
        class15: node("270011", "大阪市", Some("270000")),
        class20: node("2710000", "大阪市", Some("270011")),
    }
}

/// Area store backed by a flat node list.
#[derive(Default)]
pub struct InMemoryAreaRepository {
    nodes: Mutex<Vec<(AreaLevel, AreaNode)>>,
}

impl InMemoryAreaRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokyo and Osaka trees, including siblings used by selection flows.
    pub fn sample() -> Self {
        let store = Self::new();
        store.insert_hierarchy(&shinjuku_hierarchy());
        store.insert_hierarchy(&osaka_hierarchy());
        store.insert(AreaLevel::Class10, node("130020", "伊豆諸島北部", Some("130000")));
        store.insert(AreaLevel::Class15, node("130012", "23区東部", Some("130010")));
        store.insert(AreaLevel::Class20, node("1310100", "千代田区", Some("130012")));
        store.insert(AreaLevel::Class15, node("130021", "大島", Some("130020")));
        store.insert(AreaLevel::Class20, node("1336100", "大島町", Some("130021")));
        store
    }

    /// Add one node at `level`.
    pub fn insert(&self, level: AreaLevel, node: AreaNode) {
        self.lock().push((level, node));
    }

    /// Add every node of `hierarchy`, skipping ids already present at the
    /// same level.
    pub fn insert_hierarchy(&self, hierarchy: &HierarchyArea) {
        let levels = [
            (AreaLevel::Center, &hierarchy.center),
            (AreaLevel::Office, &hierarchy.office),
            (AreaLevel::Class10, &hierarchy.class10),
            (AreaLevel::Class15, &hierarchy.class15),
            (AreaLevel::Class20, &hierarchy.class20),
        ];
        let mut nodes = self.lock();
        for (level, node) in levels {
            if !nodes.iter().any(|(l, n)| *l == level && n.id == node.id) {
                nodes.push((level, node.clone()));
            }
        }
    }

    /// Remove a node, breaking any chain that passes through it.
    pub fn remove(&self, level: AreaLevel, id: &str) {
        self.lock().retain(|(l, n)| !(*l == level && n.id == id));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(AreaLevel, AreaNode)>> {
        match self.nodes.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("area store mutex"),
        }
    }

    fn find(nodes: &[(AreaLevel, AreaNode)], level: AreaLevel, id: &str) -> Option<AreaNode> {
        nodes
            .iter()
            .find(|(l, n)| *l == level && n.id == id)
            .map(|(_, n)| n.clone())
    }
}

#[async_trait]
impl AreaRepository for InMemoryAreaRepository {
    async fn find_hierarchy(
        &self,
        class20_id: &Class20Id,
    ) -> Result<Option<HierarchyArea>, AreaRepositoryError> {
        let nodes = self.lock();
        let parent = |node: &AreaNode, level| {
            node.parent_id
                .as_deref()
                .and_then(|id| Self::find(&nodes, level, id))
        };
        let Some(class20) = Self::find(&nodes, AreaLevel::Class20, class20_id.as_str()) else {
            return Ok(None);
        };
        let Some(class15) = parent(&class20, AreaLevel::Class15) else {
            return Ok(None);
        };
        let Some(class10) = parent(&class15, AreaLevel::Class10) else {
            return Ok(None);
        };
        let Some(office) = parent(&class10, AreaLevel::Office) else {
            return Ok(None);
        };
        let Some(center) = parent(&office, AreaLevel::Center) else {
            return Ok(None);
        };
        Ok(Some(HierarchyArea {
            center,
            office,
            class10,
            class15,
            class20,
        }))
    }

    async fn find_class20_by_name(&self, name: &str) -> Result<Vec<AreaNode>, AreaRepositoryError> {
        Ok(self
            .lock()
            .iter()
            .filter(|(level, node)| *level == AreaLevel::Class20 && node.name.contains(name))
            .map(|(_, node)| node.clone())
            .collect())
    }

    async fn find_office_by_name(
        &self,
        name: &str,
    ) -> Result<Option<AreaNode>, AreaRepositoryError> {
        Ok(self
            .lock()
            .iter()
            .find(|(level, node)| *level == AreaLevel::Office && node.name.contains(name))
            .map(|(_, node)| node.clone()))
    }

    async fn find_children(
        &self,
        parent_level: AreaLevel,
        parent_id: &str,
    ) -> Result<Vec<AreaNode>, AreaRepositoryError> {
        let Some(child_level) = parent_level.child() else {
            return Err(AreaRepositoryError::unsupported_level(parent_level.as_str()));
        };
        Ok(self
            .lock()
            .iter()
            .filter(|(level, node)| {
                *level == child_level && node.parent_id.as_deref() == Some(parent_id)
            })
            .map(|(_, node)| node.clone())
            .collect())
    }
}
