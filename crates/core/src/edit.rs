use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// One proposed tag change. `value: None` removes the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEdit {
    pub object: ObjectId,
    pub key: String,
    pub value: Option<String>,
}

impl TagEdit {
    pub fn set(object: ObjectId, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            object,
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn remove(object: ObjectId, key: impl Into<String>) -> Self {
        Self {
            object,
            key: key.into(),
            value: None,
        }
    }
}

/// An ordered set of edits the host applies as one undoable step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBatch {
    pub label: String,
    pub edits: Vec<TagEdit>,
    /// Objects to delete. Only geometry merges fill this.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deletes: Vec<ObjectId>,
}

impl EditBatch {
    pub fn new(label: impl Into<String>, edits: Vec<TagEdit>) -> Self {
        Self {
            label: label.into(),
            edits,
            deletes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.deletes.is_empty()
    }

    /// Edits targeting `object`, in batch order.
    pub fn edits_for(&self, object: ObjectId) -> impl Iterator<Item = &TagEdit> {
        self.edits.iter().filter(move |e| e.object == object)
    }
}
