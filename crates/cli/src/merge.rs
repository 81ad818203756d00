//! Collaborators the CLI hands to the reconciler.

use bagcheck_core::{Category, EditBatch, GeoObject, TagEdit};
use bagcheck_recon::{GeometryMerger, MergeOutcome, Notifier};

pub const MERGE_LABEL: &str = "Replace geometry";

/// Headless stand-in for an editor's replace-geometry.
///
/// The original keeps its identity and geometry. Tags only the new copy
/// carries move onto the original, then the new copy is deleted.
pub struct TagTransferMerge {
    pub enabled: bool,
}

impl GeometryMerger for TagTransferMerge {
    fn merge(&mut self, original: &GeoObject, new: &GeoObject) -> MergeOutcome {
        if !self.enabled {
            return MergeOutcome::Cancelled;
        }

        let (from, to) = (new.category(), original.category());
        if from == Category::Relation || to == Category::Relation {
            return MergeOutcome::Failed(format!(
                "cannot merge {} into {}: relations are merged by hand",
                new.id, original.id
            ));
        }
        if from != to {
            return MergeOutcome::Failed(format!(
                "cannot merge {} ({from}) into {} ({to})",
                new.id, original.id
            ));
        }

        let edits = new
            .tags
            .iter()
            .filter(|(key, _)| !original.has_tag(key))
            .map(|(key, value)| TagEdit::set(original.id, key.as_str(), value.as_str()))
            .collect();
        let mut batch = EditBatch::new(MERGE_LABEL, edits);
        batch.deletes.push(new.id);
        MergeOutcome::Applied(batch)
    }
}

/// Logs each notification and keeps it for the fix report.
#[derive(Debug, Default)]
pub struct LogNotifier {
    pub messages: Vec<String>,
}

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
        self.messages.push(message.to_string());
    }
}
