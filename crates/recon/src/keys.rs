use std::fmt;

use bagcheck_core::tags::REF_BAG;
use bagcheck_core::{normalize_ref, Address, GeoObject};
use serde::Serialize;

/// Normalized (16-character) BAG identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReferenceKey(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PostcodeHouseNumberKey {
    pub postcode: String,
    pub full_house_number: Option<String>,
}

/// Street + house number. Both parts may be absent; absent equals absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StreetHouseNumberKey {
    pub street: Option<String>,
    pub full_house_number: Option<String>,
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PostcodeHouseNumberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.postcode, self.full_house_number.as_deref().unwrap_or("-"))
    }
}

impl fmt::Display for StreetHouseNumberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.street.as_deref().unwrap_or("-"),
            self.full_house_number.as_deref().unwrap_or("-")
        )
    }
}

/// Key on the normalized primary reference. `None` without `ref:bag`.
pub fn reference_key_of(object: &GeoObject) -> Option<ReferenceKey> {
    normalize_ref(object.tag(REF_BAG)).map(ReferenceKey)
}

/// Key on postcode + house number. Objects without a postcode are skipped
/// so that missing postcodes never collide with each other.
pub fn postcode_house_number_key_of(object: &GeoObject) -> Option<PostcodeHouseNumberKey> {
    let address = Address::of(object);
    address.postcode.map(|postcode| PostcodeHouseNumberKey {
        postcode,
        full_house_number: address.full_house_number,
    })
}

pub fn street_house_number_key_of(object: &GeoObject) -> StreetHouseNumberKey {
    let address = Address::of(object);
    StreetHouseNumberKey {
        street: address.street,
        full_house_number: address.full_house_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagcheck_core::{Geometry, ObjectId};

    fn node(tags: &[(&str, &str)]) -> GeoObject {
        let mut obj = GeoObject::new(ObjectId::node(1), Geometry::Point { lat: 0.0, lon: 0.0 });
        for (k, v) in tags {
            obj = obj.with_tag(*k, *v);
        }
        obj
    }

    #[test]
    fn reference_key_pads() {
        let key = reference_key_of(&node(&[("ref:bag", "363100012075730")])).unwrap();
        assert_eq!(key, ReferenceKey("0363100012075730".into()));
        assert_eq!(reference_key_of(&node(&[("ref:bag:old", "1")])), None);
    }

    #[test]
    fn padded_and_unpadded_share_a_key() {
        let a = reference_key_of(&node(&[("ref:bag", "363100012075730")]));
        let b = reference_key_of(&node(&[("ref:bag", "0363100012075730")]));
        assert_eq!(a, b);
    }

    #[test]
    fn postcode_key_requires_postcode() {
        assert!(postcode_house_number_key_of(&node(&[("addr:housenumber", "1")])).is_none());
        let key = postcode_house_number_key_of(&node(&[
            ("addr:postcode", "1234 AB"),
            ("addr:housenumber", "1"),
        ]))
        .unwrap();
        assert_eq!(key.postcode, "1234AB");
        assert_eq!(key.to_string(), "1234AB 1");
    }

    #[test]
    fn street_key_is_total() {
        let a = street_house_number_key_of(&node(&[]));
        let b = street_house_number_key_of(&node(&[("addr:city", "Delft")]));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "- -");
    }
}
