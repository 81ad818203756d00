//! BAG reference equivalence and the reference duplicate index.
//!
//! The register sometimes re-identifies an object. The previous identifier
//! survives as `ref:bag:old` on one or both copies, so two objects are the
//! same BAG entity when any of their primary / superseded ids match:
//!
//! | this       | other      |
//! |------------|------------|
//! | primary    | primary    |
//! | primary    | superseded |
//! | superseded | primary    |
//! | superseded | superseded |
//!
//! Only objects with a primary `ref:bag` take part. The superseded id is an
//! alias for matching, never a reason on its own to index an object.
//!
//! Lookup keys on the individual normalized ids (the primary is the common
//! case), and the full rule is only evaluated for candidates that share one.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bagcheck_core::tags::REF_BAG_OLD;
use bagcheck_core::{normalize_ref, GeoObject, ObjectId};

use crate::index::DuplicateIndex;
use crate::keys::{reference_key_of, ReferenceKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagReference {
    pub primary: ReferenceKey,
    pub superseded: Option<ReferenceKey>,
}

impl BagReference {
    /// Normalized references of `object`; `None` without a primary `ref:bag`.
    pub fn of(object: &GeoObject) -> Option<Self> {
        let primary = reference_key_of(object)?;
        let superseded = normalize_ref(object.tag(REF_BAG_OLD)).map(ReferenceKey);
        Some(Self { primary, superseded })
    }

    pub fn is_equivalent(&self, other: &BagReference) -> bool {
        let mine = [Some(&self.primary), self.superseded.as_ref()];
        let theirs = [Some(&other.primary), other.superseded.as_ref()];
        mine.iter()
            .flatten()
            .any(|a| theirs.iter().flatten().any(|b| a == b))
    }

    /// Distinct ids this reference can be found under.
    fn lookup_keys(&self) -> impl Iterator<Item = &ReferenceKey> {
        let superseded = self.superseded.as_ref().filter(|s| **s != self.primary);
        std::iter::once(&self.primary).chain(superseded)
    }
}

/// Duplicate index over [`BagReference`] equivalence.
#[derive(Debug, Default)]
pub struct BagReferenceIndex {
    candidates: DuplicateIndex<ReferenceKey, ObjectId>,
    references: HashMap<ObjectId, BagReference>,
}

impl BagReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `object`. Returns false when it has no primary reference.
    pub fn insert(&mut self, object: &GeoObject) -> bool {
        let Some(reference) = BagReference::of(object) else {
            return false;
        };
        for key in reference.lookup_keys() {
            self.candidates.insert(key.clone(), object.id);
        }
        self.references.insert(object.id, reference);
        true
    }

    /// Equivalence groups with at least two members, keyed by the smallest
    /// primary key among the members.
    pub fn collisions(&self) -> BTreeMap<ReferenceKey, BTreeSet<ObjectId>> {
        let mut groups = UnionFind::default();

        for members in self.candidates.collisions().values() {
            let mut iter = members.iter();
            let Some(first) = iter.next() else { continue };
            for other in iter {
                if self.equivalent(first, other) {
                    groups.union(*first, *other);
                }
            }
        }

        let mut result = BTreeMap::new();
        for members in groups.components() {
            let key = members
                .iter()
                .filter_map(|id| self.references.get(id))
                .map(|reference| &reference.primary)
                .min()
                .cloned();
            if let Some(key) = key {
                result.insert(key, members);
            }
        }
        result
    }

    pub fn reset(&mut self) {
        self.candidates.reset();
        self.references.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    fn equivalent(&self, a: &ObjectId, b: &ObjectId) -> bool {
        match (self.references.get(a), self.references.get(b)) {
            (Some(ra), Some(rb)) => ra.is_equivalent(rb),
            _ => false,
        }
    }
}

/// Disjoint sets over object ids, merged as candidate groups are confirmed.
#[derive(Debug, Default)]
struct UnionFind {
    parent: HashMap<ObjectId, ObjectId>,
}

impl UnionFind {
    fn find(&mut self, id: ObjectId) -> ObjectId {
        let mut root = id;
        while let Some(&parent) = self.parent.get(&root) {
            if parent == root {
                break;
            }
            root = parent;
        }
        // path compression
        let mut current = id;
        while current != root {
            let next = self.parent.get(&current).copied().unwrap_or(root);
            self.parent.insert(current, root);
            current = next;
        }
        root
    }

    fn union(&mut self, a: ObjectId, b: ObjectId) {
        self.parent.entry(a).or_insert(a);
        self.parent.entry(b).or_insert(b);
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // smaller id becomes root so components are stable
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent.insert(child, root);
        }
    }

    fn components(&mut self) -> Vec<BTreeSet<ObjectId>> {
        let ids: Vec<ObjectId> = self.parent.keys().copied().collect();
        let mut by_root: BTreeMap<ObjectId, BTreeSet<ObjectId>> = BTreeMap::new();
        for id in ids {
            let root = self.find(id);
            by_root.entry(root).or_default().insert(id);
        }
        by_root.into_values().filter(|m| m.len() >= 2).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagcheck_core::Geometry;

    fn obj(id: i64, primary: Option<&str>, old: Option<&str>) -> GeoObject {
        let mut o = GeoObject::new(ObjectId::way(id), Geometry::Way { nodes: vec![1, 2, 3, 1] });
        if let Some(p) = primary {
            o = o.with_tag("ref:bag", p);
        }
        if let Some(s) = old {
            o = o.with_tag("ref:bag:old", s);
        }
        o
    }

    fn key(raw: &str) -> ReferenceKey {
        ReferenceKey(normalize_ref(Some(raw)).unwrap())
    }

    #[test]
    fn four_cross_products() {
        let a = BagReference::of(&obj(1, Some("A"), Some("B"))).unwrap();
        assert!(a.is_equivalent(&BagReference::of(&obj(2, Some("A"), None)).unwrap()));
        assert!(a.is_equivalent(&BagReference::of(&obj(2, Some("B"), None)).unwrap()));
        assert!(a.is_equivalent(&BagReference::of(&obj(2, Some("X"), Some("A"))).unwrap()));
        assert!(a.is_equivalent(&BagReference::of(&obj(2, Some("X"), Some("B"))).unwrap()));
        assert!(!a.is_equivalent(&BagReference::of(&obj(2, Some("X"), Some("Y"))).unwrap()));
    }

    #[test]
    fn absent_ids_never_match() {
        let a = BagReference::of(&obj(1, Some("A"), None)).unwrap();
        let b = BagReference::of(&obj(2, Some("B"), None)).unwrap();
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn no_reference_is_not_indexed() {
        let mut index = BagReferenceIndex::new();
        assert!(!index.insert(&obj(1, None, None)));
        assert!(!index.insert(&obj(2, None, Some("55"))));
        assert!(index.is_empty());
    }

    #[test]
    fn padded_forms_collide() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, Some("363100012075730"), None));
        index.insert(&obj(2, Some("0363100012075730"), None));
        let groups = index.collisions();
        assert_eq!(groups.len(), 1);
        let members = &groups[&key("363100012075730")];
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn superseded_aliases_primary() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, Some("200"), Some("100")));
        index.insert(&obj(2, Some("100"), None));
        let groups = index.collisions();
        assert_eq!(groups.len(), 1);
        // smallest primary among members
        assert!(groups.contains_key(&key("100")));
    }

    #[test]
    fn own_primary_equal_to_own_superseded_is_not_a_duplicate() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, Some("100"), Some("0000000000000100")));
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn chained_aliases_form_one_group() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(3, Some("300"), None));
        index.insert(&obj(1, Some("100"), Some("300")));
        index.insert(&obj(2, Some("200"), Some("100")));
        let groups = index.collisions();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&key("100")].len(), 3);
    }

    #[test]
    fn superseded_only_objects_are_not_reported() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, None, Some("55")));
        index.insert(&obj(2, None, Some("55")));
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn superseded_only_object_does_not_join_a_primary_group() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, Some("55"), None));
        index.insert(&obj(2, None, Some("55")));
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn shared_superseded_ids_alias() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, Some("100"), Some("55")));
        index.insert(&obj(2, Some("200"), Some("55")));
        let groups = index.collisions();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&key("100")].len(), 2);
    }

    #[test]
    fn reset_forgets_objects() {
        let mut index = BagReferenceIndex::new();
        index.insert(&obj(1, Some("1"), None));
        index.insert(&obj(2, Some("1"), None));
        index.reset();
        assert!(index.is_empty());
        assert!(index.collisions().is_empty());
    }
}
