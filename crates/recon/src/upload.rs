use bagcheck_core::tags::{is_short_ref, REF_BAG};
use bagcheck_core::{normalize_ref, EditBatch, GeoObject, TagEdit};

pub const UPLOAD_LABEL: &str = "Updating BAG Reference tag";

/// Pad short `ref:bag` values on everything about to be uploaded.
///
/// Only new or modified, non-deleted objects are touched. `None` when
/// nothing needs padding.
pub fn normalize_references_for_upload<'a>(
    objects: impl IntoIterator<Item = &'a GeoObject>,
) -> Option<EditBatch> {
    let edits: Vec<TagEdit> = objects
        .into_iter()
        .filter(|o| (o.is_new() || o.is_modified()) && !o.is_deleted())
        .filter_map(|o| {
            let raw = o.tag(REF_BAG).filter(|raw| is_short_ref(raw))?;
            let padded = normalize_ref(Some(raw))?;
            log::trace!("pad {REF_BAG} on {}: {raw} -> {padded}", o.id);
            Some(TagEdit::set(o.id, REF_BAG, padded))
        })
        .collect();

    if edits.is_empty() {
        None
    } else {
        log::info!("padding {REF_BAG} on {} objects before upload", edits.len());
        Some(EditBatch::new(UPLOAD_LABEL, edits))
    }
}
