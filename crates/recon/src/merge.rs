//! Host-side collaborators the reconciler calls out to.
//!
//! Geometry merging and user notification belong to whoever embeds the
//! engine (an editor, the CLI). The engine only sees these traits.

use bagcheck_core::{EditBatch, GeoObject};

/// Result of asking the host to merge two geometries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied(EditBatch),
    /// The host (or its user) declined. Not an error.
    Cancelled,
    Failed(String),
}

pub trait GeometryMerger {
    /// Merge `new` into `original`. Tags on `original` win.
    fn merge(&mut self, original: &GeoObject, new: &GeoObject) -> MergeOutcome;
}

impl<F> GeometryMerger for F
where
    F: FnMut(&GeoObject, &GeoObject) -> MergeOutcome,
{
    fn merge(&mut self, original: &GeoObject, new: &GeoObject) -> MergeOutcome {
        self(original, new)
    }
}

/// Surfaces a user-visible message. Only merge failures are reported here.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

impl Notifier for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}
