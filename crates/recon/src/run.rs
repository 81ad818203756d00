use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use bagcheck_core::{Address, GeoObject, ObjectId};
use serde::Serialize;

use crate::index::DuplicateIndex;
use crate::keys::{
    postcode_house_number_key_of, street_house_number_key_of, PostcodeHouseNumberKey,
    ReferenceKey, StreetHouseNumberKey,
};
use crate::reference::BagReferenceIndex;

/// Validator code for duplicate BAG objects.
pub const DUPLICATE_BAG: u32 = 13702;
/// Validator code for duplicate postcode + house number.
pub const DUPLICATE_POSTCODE_HOUSENUMBER: u32 = 13703;
/// Validator code for duplicate street + house number.
pub const DUPLICATE_STREET_HOUSENUMBER: u32 = 13704;

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DuplicateReference,
    DuplicatePostcodeHouseNumber,
    DuplicateStreetHouseNumber,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateReference => write!(f, "duplicate_reference"),
            Self::DuplicatePostcodeHouseNumber => write!(f, "duplicate_postcode_house_number"),
            Self::DuplicateStreetHouseNumber => write!(f, "duplicate_street_house_number"),
        }
    }
}

/// One collision group, ready for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub code: u32,
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
    pub key: String,
    pub objects: Vec<ObjectId>,
}

impl Finding {
    /// Only reference duplicates are candidates for automatic fixes.
    pub fn is_fixable_kind(&self) -> bool {
        self.kind == FindingKind::DuplicateReference
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub engine_version: String,
    pub run_at: String,
    pub objects_visited: usize,
}

/// Collision groups of one finished run, per index.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub meta: ReportMeta,
    pub references: BTreeMap<ReferenceKey, BTreeSet<ObjectId>>,
    pub postcode_house_numbers: BTreeMap<PostcodeHouseNumberKey, BTreeSet<ObjectId>>,
    pub street_house_numbers: BTreeMap<StreetHouseNumberKey, BTreeSet<ObjectId>>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.references.is_empty()
            && self.postcode_house_numbers.is_empty()
            && self.street_house_numbers.is_empty()
    }

    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (key, members) in &self.references {
            findings.push(Finding {
                code: DUPLICATE_BAG,
                severity: Severity::Error,
                kind: FindingKind::DuplicateReference,
                message: format!("Duplicate BAG object for {key}"),
                key: key.to_string(),
                objects: members.iter().copied().collect(),
            });
        }

        for (key, members) in &self.postcode_house_numbers {
            findings.push(Finding {
                code: DUPLICATE_POSTCODE_HOUSENUMBER,
                severity: Severity::Warning,
                kind: FindingKind::DuplicatePostcodeHouseNumber,
                message: format!("Duplicate address {key}"),
                key: key.to_string(),
                objects: members.iter().copied().collect(),
            });
        }

        for (key, members) in &self.street_house_numbers {
            findings.push(Finding {
                code: DUPLICATE_STREET_HOUSENUMBER,
                severity: Severity::Warning,
                kind: FindingKind::DuplicateStreetHouseNumber,
                message: format!("Duplicate address {key}"),
                key: key.to_string(),
                objects: members.iter().copied().collect(),
            });
        }

        findings
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// One validation pass over a dataset snapshot.
///
/// `start` → `visit` each in-scope object once → `finish`. Indices live only
/// between `start` and `finish`; nothing carries over to the next run.
#[derive(Debug, Default)]
pub struct ValidationRun {
    references: BagReferenceIndex,
    postcodes: DuplicateIndex<PostcodeHouseNumberKey, ObjectId>,
    streets: DuplicateIndex<StreetHouseNumberKey, ObjectId>,
    /// Normalized postcode of every address in `streets`.
    street_postcodes: HashMap<ObjectId, Option<String>>,
    visited: HashSet<ObjectId>,
    running: bool,
}

impl ValidationRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.clear();
        self.running = true;
        log::debug!("validation run started");
    }

    /// Feed one object. Every category goes through here.
    pub fn visit(&mut self, object: &GeoObject) {
        if !self.running {
            log::warn!("{} visited outside a validation run, ignored", object.id);
            return;
        }
        if !self.visited.insert(object.id) {
            log::warn!("{} visited twice in one run, ignored", object.id);
            return;
        }

        log::trace!("visit {} ({})", object.id, object.category());

        self.references.insert(object);

        if Address::is_present(object) {
            if let Some(key) = postcode_house_number_key_of(object) {
                self.postcodes.insert(key, object.id);
            }
            self.streets.insert(street_house_number_key_of(object), object.id);
            self.street_postcodes.insert(object.id, Address::of(object).postcode);
        }
    }

    /// Collect collision groups and clear every index.
    pub fn finish(&mut self) -> ValidationReport {
        let report = ValidationReport {
            meta: ReportMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                objects_visited: self.visited.len(),
            },
            references: self.references.collisions(),
            postcode_house_numbers: sorted(self.postcodes.collisions()),
            street_house_numbers: self.street_collisions(),
        };

        log::debug!(
            "validation run finished: {} objects, {} reference groups, {} postcode groups, {} street groups",
            report.meta.objects_visited,
            report.references.len(),
            report.postcode_house_numbers.len(),
            report.street_house_numbers.len(),
        );

        self.clear();
        self.running = false;
        report
    }

    /// Street groups whose members do not all share one postcode. Same
    /// street, number and postcode is already a postcode duplicate.
    fn street_collisions(&self) -> BTreeMap<StreetHouseNumberKey, BTreeSet<ObjectId>> {
        self.streets
            .collisions()
            .iter()
            .filter(|(_, members)| {
                let postcodes: HashSet<Option<&str>> = members
                    .iter()
                    .map(|id| self.street_postcodes.get(id).and_then(|pc| pc.as_deref()))
                    .collect();
                postcodes.len() > 1
            })
            .map(|(key, members)| (key.clone(), members.clone()))
            .collect()
    }

    fn clear(&mut self) {
        self.references.reset();
        self.postcodes.reset();
        self.streets.reset();
        self.street_postcodes.clear();
        self.visited.clear();
    }
}

fn sorted<K: Ord + Clone>(
    groups: &std::collections::HashMap<K, BTreeSet<ObjectId>>,
) -> BTreeMap<K, BTreeSet<ObjectId>> {
    groups.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Run a full pass over `objects`.
pub fn validate<'a>(objects: impl IntoIterator<Item = &'a GeoObject>) -> ValidationReport {
    let mut run = ValidationRun::new();
    run.start();
    for object in objects {
        run.visit(object);
    }
    run.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagcheck_core::Geometry;

    fn building(id: i64) -> GeoObject {
        GeoObject::new(ObjectId::way(id), Geometry::Way { nodes: vec![1, 2, 3, 1] })
            .with_tag("building", "house")
    }

    fn address(id: i64, street: &str, hnr: &str, pc: Option<&str>) -> GeoObject {
        let mut node = GeoObject::new(ObjectId::node(id), Geometry::Point { lat: 52.0, lon: 4.0 })
            .with_tag("addr:street", street)
            .with_tag("addr:housenumber", hnr);
        if let Some(pc) = pc {
            node = node.with_tag("addr:postcode", pc);
        }
        node
    }

    #[test]
    fn reference_duplicates_reported() {
        let a = building(1).with_tag("ref:bag", "363100012075730");
        let b = building(2).with_tag("ref:bag", "0363100012075730");
        let c = building(3).with_tag("ref:bag", "0363100012999999");
        let report = validate([&a, &b, &c]);

        assert_eq!(report.references.len(), 1);
        let findings = report.findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, DUPLICATE_BAG);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].message, "Duplicate BAG object for 0363100012075730");
        assert_eq!(findings[0].objects, vec![ObjectId::way(1), ObjectId::way(2)]);
    }

    #[test]
    fn objects_without_reference_are_not_flagged() {
        let report = validate([&building(1), &building(2)]);
        assert!(report.is_clean());
    }

    #[test]
    fn address_duplicates_by_postcode_and_street() {
        let a = address(1, "Dorpsstraat", "1", Some("1234 AB"));
        let b = address(2, "Dorpsstraat", "1", Some("1234AB"));
        let c = address(3, "Dorpsstraat", "2", None);
        let d = address(4, "Dorpsstraat", "2", None);
        let e = address(5, "Dorpsstraat", "3", Some("1234AB"));
        let f = address(6, "Dorpsstraat", "3", Some("5678CD"));
        let report = validate([&a, &b, &c, &d, &e, &f]);

        assert_eq!(report.postcode_house_numbers.len(), 1);
        // missing postcodes never collide in the postcode index
        assert!(report
            .postcode_house_numbers
            .keys()
            .all(|k| k.postcode == "1234AB"));

        // same postcode (or both absent) is not a street duplicate
        let streets: Vec<&BTreeSet<ObjectId>> = report.street_house_numbers.values().collect();
        assert_eq!(streets, vec![&BTreeSet::from([ObjectId::node(5), ObjectId::node(6)])]);

        let kinds: Vec<FindingKind> = report.findings().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FindingKind::DuplicatePostcodeHouseNumber,
                FindingKind::DuplicateStreetHouseNumber,
            ]
        );
    }

    #[test]
    fn street_group_with_mixed_postcodes_reported_whole() {
        let a = address(1, "Dorpsstraat", "1", Some("1234AB"));
        let b = address(2, "Dorpsstraat", "1", Some("1234 AB"));
        let c = address(3, "Dorpsstraat", "1", None);
        let report = validate([&a, &b, &c]);
        assert_eq!(report.postcode_house_numbers.len(), 1);
        assert_eq!(report.street_house_numbers.len(), 1);
        assert_eq!(report.street_house_numbers.values().next().map(|m| m.len()), Some(3));
    }

    #[test]
    fn superseded_reference_alone_is_not_a_duplicate() {
        let a = building(1).with_tag("ref:bag:old", "55");
        let b = building(2).with_tag("ref:bag:old", "55");
        assert!(validate([&a, &b]).is_clean());
    }

    #[test]
    fn second_visit_is_ignored() {
        let a = building(1).with_tag("ref:bag", "1");
        let mut run = ValidationRun::new();
        run.start();
        run.visit(&a);
        run.visit(&a);
        let report = run.finish();
        assert!(report.references.is_empty());
        assert_eq!(report.meta.objects_visited, 1);
    }

    #[test]
    fn visit_outside_run_is_ignored() {
        let a = building(1).with_tag("ref:bag", "1");
        let b = building(2).with_tag("ref:bag", "1");
        let mut run = ValidationRun::new();
        run.visit(&a);
        run.start();
        run.visit(&b);
        let report = run.finish();
        assert!(report.references.is_empty());
        assert!(!run.is_running());
    }

    #[test]
    fn finish_clears_for_next_run() {
        let a = building(1).with_tag("ref:bag", "1");
        let b = building(2).with_tag("ref:bag", "1");
        let mut run = ValidationRun::new();
        run.start();
        run.visit(&a);
        run.visit(&b);
        assert_eq!(run.finish().references.len(), 1);

        run.start();
        run.visit(&a);
        let report = run.finish();
        assert!(report.references.is_empty());
        assert_eq!(report.meta.objects_visited, 1);
    }
}
