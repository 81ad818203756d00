use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Primitive kind of a dataset object. Ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Node,
    Way,
    Relation,
}

impl PrimitiveKind {
    fn prefix(self) -> char {
        match self {
            Self::Node => 'n',
            Self::Way => 'w',
            Self::Relation => 'r',
        }
    }
}

/// Identity of a dataset object, e.g. `n123`, `w-4`, `r77`.
///
/// Negative ids are the editor convention for objects that only exist
/// locally, but the `new` flag on [`GeoObject`] is what the engine trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId {
    pub kind: PrimitiveKind,
    pub id: i64,
}

impl ObjectId {
    pub const fn node(id: i64) -> Self {
        Self { kind: PrimitiveKind::Node, id }
    }

    pub const fn way(id: i64) -> Self {
        Self { kind: PrimitiveKind::Way, id }
    }

    pub const fn relation(id: i64) -> Self {
        Self { kind: PrimitiveKind::Relation, id }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseObjectIdError(pub String);

impl fmt::Display for ParseObjectIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid object id '{}' (expected n<id>, w<id> or r<id>)", self.0)
    }
}

impl std::error::Error for ParseObjectIdError {}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = match chars.next() {
            Some('n') => PrimitiveKind::Node,
            Some('w') => PrimitiveKind::Way,
            Some('r') => PrimitiveKind::Relation,
            _ => return Err(ParseObjectIdError(s.to_string())),
        };
        let id = chars
            .as_str()
            .parse::<i64>()
            .map_err(|_| ParseObjectIdError(s.to_string()))?;
        Ok(Self { kind, id })
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ParseObjectIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Geometry handle. The engine never looks inside beyond classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point { lat: f64, lon: f64 },
    Way { nodes: Vec<i64> },
    Relation { members: Vec<ObjectId> },
}

/// Closed set of object categories fed to the single visit entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Point,
    Line,
    Area,
    Relation,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "point"),
            Self::Line => write!(f, "line"),
            Self::Area => write!(f, "area"),
            Self::Relation => write!(f, "relation"),
        }
    }
}

/// Classify an object by its geometry. A way is an area when its node
/// list is closed: at least four refs with the first equal to the last.
pub fn classify(object: &GeoObject) -> Category {
    match &object.geometry {
        Geometry::Point { .. } => Category::Point,
        Geometry::Way { nodes } => {
            if nodes.len() >= 4 && nodes.first() == nodes.last() {
                Category::Area
            } else {
                Category::Line
            }
        }
        Geometry::Relation { .. } => Category::Relation,
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A dataset object as seen by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoObject {
    pub id: ObjectId,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Exists only locally, not yet persisted upstream.
    #[serde(default)]
    pub new: bool,
    /// Changed locally since download.
    #[serde(default)]
    pub modified: bool,
    #[serde(default)]
    pub deleted: bool,
    pub geometry: Geometry,
}

impl GeoObject {
    pub fn new(id: ObjectId, geometry: Geometry) -> Self {
        Self {
            id,
            tags: BTreeMap::new(),
            new: false,
            modified: false,
            deleted: false,
            geometry,
        }
    }

    /// Builder-style tag setter, mostly for fixtures.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_new(mut self, new: bool) -> Self {
        self.new = new;
        self
    }

    pub fn with_modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }

    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn is_new(&self) -> bool {
        self.new
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn category(&self) -> Category {
        classify(self)
    }
}
