//! JSON dataset files and edit application.
//!
//! A dataset is `{"objects": [...]}` where each object is a
//! [`GeoObject`]. The CLI is the host: it applies the edit batches the
//! engine proposes and writes the result back out.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use bagcheck_core::{EditBatch, GeoObject, ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum DatasetError {
    Io(String),
    Parse(String),
    /// An edit targets an object the dataset does not contain.
    UnknownObject(ObjectId),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "dataset IO error: {msg}"),
            Self::Parse(msg) => write!(f, "dataset parse error: {msg}"),
            Self::UnknownObject(id) => write!(f, "edit targets unknown object {id}"),
        }
    }
}

impl std::error::Error for DatasetError {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub objects: Vec<GeoObject>,
}

impl Dataset {
    pub fn from_json(input: &str) -> Result<Self, DatasetError> {
        let dataset: Self =
            serde_json::from_str(input).map_err(|e| DatasetError::Parse(e.to_string()))?;
        log::debug!("loaded dataset with {} objects", dataset.objects.len());
        Ok(dataset)
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| DatasetError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&input)
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DatasetError::Parse(format!("JSON serialization error: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| DatasetError::Io(format!("cannot write {}: {e}", path.display())))
    }

    /// Objects still in the dataset, i.e. not marked deleted. Validation
    /// only looks at these.
    pub fn live(&self) -> impl Iterator<Item = &GeoObject> {
        self.objects.iter().filter(|o| !o.is_deleted())
    }

    pub fn index(&self) -> HashMap<ObjectId, &GeoObject> {
        self.objects.iter().map(|o| (o.id, o)).collect()
    }

    /// Apply one batch as a unit: every target is checked before anything
    /// changes. Touched objects that were already upstream become modified.
    pub fn apply(&mut self, batch: &EditBatch) -> Result<usize, DatasetError> {
        let positions: HashMap<ObjectId, usize> = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id, i))
            .collect();

        let targets = batch.edits.iter().map(|e| e.object).chain(batch.deletes.iter().copied());
        for id in targets {
            if !positions.contains_key(&id) {
                return Err(DatasetError::UnknownObject(id));
            }
        }

        let mut changed = 0;
        for edit in &batch.edits {
            let object = &mut self.objects[positions[&edit.object]];
            let previous = match &edit.value {
                Some(value) => object.tags.insert(edit.key.clone(), value.clone()),
                None => object.tags.remove(&edit.key),
            };
            if previous != edit.value {
                changed += 1;
                mark_modified(object);
            }
        }
        for id in &batch.deletes {
            let object = &mut self.objects[positions[id]];
            if !object.deleted {
                object.deleted = true;
                changed += 1;
                mark_modified(object);
            }
        }

        log::info!("{}: {changed} changes", batch.label);
        Ok(changed)
    }
}

fn mark_modified(object: &mut GeoObject) {
    if !object.new {
        object.modified = true;
    }
}
