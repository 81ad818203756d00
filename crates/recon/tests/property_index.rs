// Property-based tests for the duplicate indices.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, BTreeSet};

use bagcheck_core::{normalize_ref, GeoObject, Geometry, ObjectId};
use bagcheck_recon::{validate, DuplicateIndex};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small id space so that collisions are common; sometimes zero-padded.
fn arb_reference() -> impl Strategy<Value = String> {
    (0u32..6, prop::bool::ANY).prop_map(|(n, padded)| {
        if padded {
            format!("{n:016}")
        } else {
            n.to_string()
        }
    })
}

fn arb_object(id: i64) -> impl Strategy<Value = GeoObject> {
    (
        prop::option::of(arb_reference()),
        prop::option::of(arb_reference()),
        prop::option::of(0u8..3),
        prop::option::of(prop_oneof![Just("1234AB"), Just("1234 AB"), Just("5678CD")]),
    )
        .prop_map(move |(primary, old, hnr, postcode)| {
            let mut obj =
                GeoObject::new(ObjectId::way(id), Geometry::Way { nodes: vec![1, 2, 3, 1] });
            if let Some(p) = primary {
                obj = obj.with_tag("ref:bag", p);
            }
            if let Some(s) = old {
                obj = obj.with_tag("ref:bag:old", s);
            }
            if let Some(h) = hnr {
                obj = obj.with_tag("addr:housenumber", h.to_string());
            }
            if let Some(pc) = postcode {
                obj = obj.with_tag("addr:postcode", pc);
            }
            obj
        })
}

/// A dataset plus a shuffled copy of it.
fn arb_dataset() -> impl Strategy<Value = (Vec<GeoObject>, Vec<GeoObject>)> {
    (1usize..24)
        .prop_flat_map(|n| (0..n as i64).map(arb_object).collect::<Vec<_>>())
        .prop_flat_map(|objects| {
            let shuffled = Just(objects.clone()).prop_shuffle();
            (Just(objects), shuffled)
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn index_collisions_order_independent(
        pairs in proptest::collection::vec((0u8..8, 0u32..16), 0..64)
            .prop_flat_map(|p| (Just(p.clone()), Just(p).prop_shuffle()))
    ) {
        let (forward, shuffled) = pairs;
        let collect = |input: &[(u8, u32)]| {
            let mut index = DuplicateIndex::new();
            for (k, v) in input {
                index.insert(*k, *v);
            }
            index
                .collisions()
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect::<BTreeMap<u8, BTreeSet<u32>>>()
        };
        prop_assert_eq!(collect(&forward), collect(&shuffled));
    }

    #[test]
    fn index_sets_are_real_collisions(
        pairs in proptest::collection::vec((0u8..8, 0u32..16), 0..64)
    ) {
        let mut index = DuplicateIndex::new();
        for (k, v) in &pairs {
            index.insert(*k, *v);
        }
        let mut seen = 0;
        for (key, set) in index.collisions() {
            prop_assert!(set.len() >= 2);
            for v in set {
                prop_assert!(pairs.contains(&(*key, *v)));
            }
            seen += set.len();
        }
        prop_assert!(seen <= pairs.len());
    }

    #[test]
    fn validation_order_independent((objects, shuffled) in arb_dataset()) {
        let a = validate(&objects);
        let b = validate(&shuffled);
        prop_assert_eq!(a.references, b.references);
        prop_assert_eq!(a.postcode_house_numbers, b.postcode_house_numbers);
        prop_assert_eq!(a.street_house_numbers, b.street_house_numbers);
    }

    #[test]
    fn reference_groups_are_disjoint((objects, _) in arb_dataset()) {
        let report = validate(&objects);
        let mut members = BTreeSet::new();
        for group in report.references.values() {
            for id in group {
                prop_assert!(members.insert(*id), "{} in two groups", id);
            }
        }
    }

    #[test]
    fn reported_references_have_primary((objects, _) in arb_dataset()) {
        let report = validate(&objects);
        for group in report.references.values() {
            for id in group {
                let object = objects.iter().find(|o| o.id == *id);
                prop_assert!(object.map_or(false, |o| o.has_tag("ref:bag")), "{} has no ref:bag", id);
            }
        }
    }

    #[test]
    fn normalize_is_idempotent(raw in "[0-9]{0,20}") {
        let once = normalize_ref(Some(raw.as_str()));
        let twice = normalize_ref(once.as_deref());
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.map_or(false, |r| r.len() >= 16));
    }
}

#[test]
fn normalize_none_is_none() {
    assert_eq!(normalize_ref(None), None);
}
