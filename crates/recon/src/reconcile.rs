//! Proposes a fix for one duplicate pair.
//!
//! The pair is split into the *original* (already upstream) and the *new*
//! copy (exists only locally). Tag differences are settled first; only a
//! pair whose tags already agree is handed to the geometry merger.
//!
//! Nothing here fails hard. Every dead end is a [`NoFixReason`] and the
//! duplicate stays reported.

use std::cmp::Ordering;
use std::fmt;

use bagcheck_core::tags::{
    is_short_ref, BUILDING, CONSTRUCTION, DATE_FORMAT, REF_BAG, SOURCE, SOURCE_DATE, START_DATE,
};
use bagcheck_core::{normalize_ref, EditBatch, GeoObject, ObjectId, TagEdit};
use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{BuildingClass, BuildingTaxonomy, ReconcileConfig};
use crate::exclusion::{ExclusionPolicy, Exemption};
use crate::merge::{GeometryMerger, MergeOutcome, Notifier};
use crate::run::Finding;

pub const TAG_UPDATE_LABEL: &str = "Updating BAG Object tags";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FixOutcome {
    TagUpdate(EditBatch),
    GeometryMerge(EditBatch),
    NoFix { reason: NoFixReason },
}

impl FixOutcome {
    fn no_fix(reason: NoFixReason) -> Self {
        Self::NoFix { reason }
    }

    pub fn batch(&self) -> Option<&EditBatch> {
        match self {
            Self::TagUpdate(batch) | Self::GeometryMerge(batch) => Some(batch),
            Self::NoFix { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoFixReason {
    /// Only pairs are reconciled.
    GroupSize { size: usize },
    Deleted { object: ObjectId },
    Exempt { object: ObjectId, exemption: Exemption },
    /// Both or neither copy is new.
    AmbiguousRole { both_new: bool },
    /// The merger applied nothing.
    NothingToMerge,
    MergeCancelled,
    MergeFailed { message: String },
    /// A group member is not in the dataset handed to the reconciler.
    MissingObject { object: ObjectId },
}

impl NoFixReason {
    /// Stable short name, used for summary buckets.
    pub fn code(&self) -> &'static str {
        match self {
            Self::GroupSize { .. } => "group_size",
            Self::Deleted { .. } => "deleted",
            Self::Exempt { .. } => "exempt",
            Self::AmbiguousRole { .. } => "ambiguous_role",
            Self::NothingToMerge => "nothing_to_merge",
            Self::MergeCancelled => "merge_cancelled",
            Self::MergeFailed { .. } => "merge_failed",
            Self::MissingObject { .. } => "missing_object",
        }
    }
}

impl fmt::Display for NoFixReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupSize { size } => write!(f, "{size} objects share this reference"),
            Self::Deleted { object } => write!(f, "{object} is deleted"),
            Self::Exempt { object, exemption } => write!(f, "{object} is exempt ({exemption})"),
            Self::AmbiguousRole { both_new: true } => write!(f, "both objects are new"),
            Self::AmbiguousRole { both_new: false } => write!(f, "neither object is new"),
            Self::NothingToMerge => write!(f, "geometry merge changed nothing"),
            Self::MergeCancelled => write!(f, "geometry merge cancelled"),
            Self::MergeFailed { message } => write!(f, "geometry merge failed: {message}"),
            Self::MissingObject { object } => write!(f, "{object} not found in dataset"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Propose a fix for one duplicate group.
pub fn reconcile(
    group: &[&GeoObject],
    config: &ReconcileConfig,
    merger: &mut dyn GeometryMerger,
    notifier: &mut dyn Notifier,
) -> FixOutcome {
    let [a, b] = group else {
        return FixOutcome::no_fix(NoFixReason::GroupSize { size: group.len() });
    };
    let (a, b) = (*a, *b);

    for object in [a, b] {
        if object.is_deleted() {
            return FixOutcome::no_fix(NoFixReason::Deleted { object: object.id });
        }
    }

    let policy = ExclusionPolicy::new(&config.exclusion);
    for object in [a, b] {
        if let Some(exemption) = policy.exemption(object) {
            log::debug!("{} exempt from automatic fixes: {exemption}", object.id);
            return FixOutcome::no_fix(NoFixReason::Exempt {
                object: object.id,
                exemption,
            });
        }
    }

    let (original, new) = match (a.is_new(), b.is_new()) {
        (false, true) => (a, b),
        (true, false) => (b, a),
        (both_new, _) => return FixOutcome::no_fix(NoFixReason::AmbiguousRole { both_new }),
    };

    if let Some(batch) = propose_tag_updates(original, new, config) {
        log::debug!(
            "{} tag edits for {} / {}",
            batch.edits.len(),
            original.id,
            new.id
        );
        return FixOutcome::TagUpdate(batch);
    }

    log::debug!("tags agree, merging {} into {}", new.id, original.id);
    match merger.merge(original, new) {
        MergeOutcome::Applied(batch) if batch.is_empty() => {
            FixOutcome::no_fix(NoFixReason::NothingToMerge)
        }
        MergeOutcome::Applied(batch) => FixOutcome::GeometryMerge(batch),
        MergeOutcome::Cancelled => FixOutcome::no_fix(NoFixReason::MergeCancelled),
        MergeOutcome::Failed(message) => {
            log::warn!("merge of {} into {} failed: {message}", new.id, original.id);
            notifier.notify(&message);
            FixOutcome::no_fix(NoFixReason::MergeFailed { message })
        }
    }
}

/// A reconciliation attempt for one finding.
#[derive(Debug, Clone, Serialize)]
pub struct ProposedFix {
    pub key: String,
    pub objects: Vec<ObjectId>,
    #[serde(flatten)]
    pub outcome: FixOutcome,
}

/// Reconcile every reference finding. Address findings are report-only and
/// skipped.
pub fn reconcile_findings<'a, F>(
    findings: &[Finding],
    lookup: F,
    config: &ReconcileConfig,
    merger: &mut dyn GeometryMerger,
    notifier: &mut dyn Notifier,
) -> Vec<ProposedFix>
where
    F: Fn(&ObjectId) -> Option<&'a GeoObject>,
{
    findings
        .iter()
        .filter(|finding| finding.is_fixable_kind())
        .map(|finding| {
            let resolved: Result<Vec<&GeoObject>, ObjectId> = finding
                .objects
                .iter()
                .map(|id| lookup(id).ok_or(*id))
                .collect();
            let outcome = match resolved {
                Ok(group) => reconcile(&group, config, &mut *merger, &mut *notifier),
                Err(object) => FixOutcome::no_fix(NoFixReason::MissingObject { object }),
            };
            ProposedFix {
                key: finding.key.clone(),
                objects: finding.objects.clone(),
                outcome,
            }
        })
        .collect()
}

/// Tag edits that bring `original` and `new` in line, or `None` when they
/// already agree.
pub fn propose_tag_updates(
    original: &GeoObject,
    new: &GeoObject,
    config: &ReconcileConfig,
) -> Option<EditBatch> {
    let mut edits = Vec::new();

    repair_references(original, new, &mut edits);
    converge_source_dates(original, new, &mut edits);
    let effective = settle_construction(original, new, &mut edits);
    merge_building(original, new, &effective, &config.building, &mut edits);
    copy_onto_original(original, new, START_DATE, &mut edits);
    copy_onto_original(original, new, SOURCE, &mut edits);

    if edits.is_empty() {
        None
    } else {
        Some(EditBatch::new(TAG_UPDATE_LABEL, edits))
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Push `key=value` on `object` unless it already holds that value.
fn set_if_changed(object: &GeoObject, key: &str, value: &str, edits: &mut Vec<TagEdit>) {
    if object.tag(key) != Some(value) {
        edits.push(TagEdit::set(object.id, key, value));
    }
}

fn repair_references(original: &GeoObject, new: &GeoObject, edits: &mut Vec<TagEdit>) {
    let (Some(raw_a), Some(raw_b)) = (original.tag(REF_BAG), new.tag(REF_BAG)) else {
        return;
    };
    if raw_a == raw_b {
        return;
    }
    let normalized = normalize_ref(Some(raw_a));
    if normalized != normalize_ref(Some(raw_b)) {
        return;
    }
    let Some(normalized) = normalized else { return };
    for (object, raw) in [(original, raw_a), (new, raw_b)] {
        if is_short_ref(raw) {
            edits.push(TagEdit::set(object.id, REF_BAG, normalized.as_str()));
        }
    }
}

/// Strict `yyyy-MM-dd`. Anything else counts as absent.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, DATE_FORMAT).ok()
}

fn converge_source_dates(original: &GeoObject, new: &GeoObject, edits: &mut Vec<TagEdit>) {
    let (Some(raw_a), Some(raw_b)) = (original.tag(SOURCE_DATE), new.tag(SOURCE_DATE)) else {
        return;
    };
    let (Some(date_a), Some(date_b)) = (parse_date(Some(raw_a)), parse_date(Some(raw_b))) else {
        log::trace!("unparsable {SOURCE_DATE} on {} or {}", original.id, new.id);
        return;
    };
    match date_a.cmp(&date_b) {
        Ordering::Less => edits.push(TagEdit::set(original.id, SOURCE_DATE, raw_b)),
        Ordering::Greater => edits.push(TagEdit::set(new.id, SOURCE_DATE, raw_a)),
        Ordering::Equal => {}
    }
}

/// Building value the original effectively carries.
struct EffectiveBuilding<'a> {
    value: Option<&'a str>,
    /// Taken from a `construction` tag that was just removed.
    promoted: bool,
}

fn settle_construction<'a>(
    original: &'a GeoObject,
    new: &GeoObject,
    edits: &mut Vec<TagEdit>,
) -> EffectiveBuilding<'a> {
    match original.tag(CONSTRUCTION) {
        Some(value) if !new.has_tag(CONSTRUCTION) => {
            edits.push(TagEdit::remove(original.id, CONSTRUCTION));
            EffectiveBuilding {
                value: Some(value),
                promoted: true,
            }
        }
        _ => EffectiveBuilding {
            value: original.tag(BUILDING),
            promoted: false,
        },
    }
}

fn merge_building(
    original: &GeoObject,
    new: &GeoObject,
    effective: &EffectiveBuilding<'_>,
    taxonomy: &BuildingTaxonomy,
    edits: &mut Vec<TagEdit>,
) {
    if !original.has_tag(BUILDING) {
        return;
    }
    let (Some(kept), Some(incoming)) = (effective.value, new.tag(BUILDING)) else {
        return;
    };

    let keep_original = |edits: &mut Vec<TagEdit>| {
        set_if_changed(new, BUILDING, kept, edits);
        if effective.promoted {
            set_if_changed(original, BUILDING, kept, edits);
        }
    };

    if kept == incoming || taxonomy.is_affirmative(incoming) {
        keep_original(edits);
        return;
    }

    match taxonomy.classify(kept) {
        BuildingClass::Specific => keep_original(edits),
        BuildingClass::Generic => set_if_changed(original, BUILDING, incoming, edits),
        BuildingClass::Unclassified => {
            log::debug!(
                "{BUILDING}={kept} on {} is unclassified, left for manual review",
                original.id
            );
        }
    }
}

fn copy_onto_original(original: &GeoObject, new: &GeoObject, key: &str, edits: &mut Vec<TagEdit>) {
    if let (Some(theirs), Some(_)) = (new.tag(key), original.tag(key)) {
        set_if_changed(original, key, theirs, edits);
    }
}
