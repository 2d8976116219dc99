//! Administrative area hierarchy model.
//!
//! The hierarchy has five strict levels: center, office, class10, class15
//! and class20. Offices key forecast documents, class10 codes key the weather
//! blocks inside them, and class20 leaves are what a user finally selects.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Length of a well-formed class20 leaf identifier.
pub const CLASS20_ID_LEN: usize = 7;

/// Level of a node within the area hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AreaLevel {
    Center,
    Office,
    Class10,
    Class15,
    Class20,
}

impl AreaLevel {
    /// The level directly below this one, if any.
    #[must_use]
    pub fn child(self) -> Option<Self> {
        match self {
            Self::Center => Some(Self::Office),
            Self::Office => Some(Self::Class10),
            Self::Class10 => Some(Self::Class15),
            Self::Class15 => Some(Self::Class20),
            Self::Class20 => None,
        }
    }

    /// Stable snake_case label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Office => "office",
            Self::Class10 => "class10",
            Self::Class15 => "class15",
            Self::Class20 => "class20",
        }
    }
}

impl fmt::Display for AreaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the hierarchy, owned by value.
///
/// `parent_id` is `None` only for centers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AreaNode {
    #[schema(example = "1310100")]
    pub id: String,
    #[schema(example = "千代田区")]
    pub name: String,
    #[schema(example = "Chiyoda City")]
    pub en_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl AreaNode {
    /// Build a node with a parent link.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        en_name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            en_name: en_name.into(),
            parent_id,
        }
    }

    fn is_child_of(&self, parent: &AreaNode) -> bool {
        self.parent_id.as_deref() == Some(parent.id.as_str())
    }
}

/// Denormalised snapshot of one leaf and all of its ancestors.
///
/// Produced by a single resolution and never partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyArea {
    pub center: AreaNode,
    pub office: AreaNode,
    pub class10: AreaNode,
    pub class15: AreaNode,
    pub class20: AreaNode,
}

impl HierarchyArea {
    /// Whether every node's parent link points at the node one level up.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.center.parent_id.is_none()
            && self.office.is_child_of(&self.center)
            && self.class10.is_child_of(&self.office)
            && self.class15.is_child_of(&self.class10)
            && self.class20.is_child_of(&self.class15)
    }
}

/// Errors raised when validating area identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AreaIdValidationError {
    #[error("class20 id must be exactly {expected} ASCII digits, got {actual:?}")]
    MalformedClass20 { expected: usize, actual: String },
}

/// Validated class20 leaf identifier.
///
/// # Examples
/// ```
/// use weather_bot::domain::Class20Id;
///
/// assert!(Class20Id::parse("1310100").is_ok());
/// assert!(Class20Id::parse("13101").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Class20Id(String);

impl Class20Id {
    /// Validate a raw identifier without touching storage.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, AreaIdValidationError> {
        let raw = raw.as_ref();
        let well_formed =
            raw.len() == CLASS20_ID_LEN && raw.bytes().all(|byte| byte.is_ascii_digit());
        if well_formed {
            Ok(Self(raw.to_owned()))
        } else {
            Err(AreaIdValidationError::MalformedClass20 {
                expected: CLASS20_ID_LEN,
                actual: raw.to_owned(),
            })
        }
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Class20Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
