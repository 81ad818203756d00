use serde::Serialize;

use crate::object::GeoObject;
use crate::tags::{ADDR_CITY, ADDR_HOUSENUMBER, ADDR_POSTCODE, ADDR_STREET};

/// Read-only address view derived from an object's `addr:*` tags.
///
/// Equality is structural over full house number, postcode, street and
/// city. The parsed numeric house number is derived and does not take part.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub full_house_number: Option<String>,
    /// Leading digit run of the house number (`12a` -> 12).
    pub house_number: Option<u32>,
    pub street: Option<String>,
    /// Postcode with all spaces removed (`1234 AB` -> `1234AB`).
    pub postcode: Option<String>,
    pub city: Option<String>,
}

impl Address {
    pub fn of(object: &GeoObject) -> Self {
        let full_house_number = object.tag(ADDR_HOUSENUMBER).map(str::to_string);
        let house_number = full_house_number.as_deref().and_then(parse_leading_number);
        Self {
            full_house_number,
            house_number,
            street: object.tag(ADDR_STREET).map(str::to_string),
            postcode: normalize_postcode(object.tag(ADDR_POSTCODE)),
            city: object.tag(ADDR_CITY).map(str::to_string),
        }
    }

    /// True when the object carries enough of an address to be indexed.
    pub fn is_present(object: &GeoObject) -> bool {
        object.has_tag(ADDR_HOUSENUMBER) || object.has_tag(ADDR_STREET) || object.has_tag(ADDR_POSTCODE)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.full_house_number == other.full_house_number
            && self.postcode == other.postcode
            && self.street == other.street
            && self.city == other.city
    }
}

impl Eq for Address {}

pub fn normalize_postcode(pc: Option<&str>) -> Option<String> {
    pc.map(|p| p.replace(' ', ""))
}

fn parse_leading_number(full: &str) -> Option<u32> {
    let end = full
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(full.len());
    if end == 0 {
        return None;
    }
    full[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Geometry, ObjectId};

    fn node(tags: &[(&str, &str)]) -> GeoObject {
        let mut obj = GeoObject::new(ObjectId::node(1), Geometry::Point { lat: 52.0, lon: 5.0 });
        for (k, v) in tags {
            obj.tags.insert(k.to_string(), v.to_string());
        }
        obj
    }

    #[test]
    fn parses_leading_digits() {
        let addr = Address::of(&node(&[("addr:housenumber", "12a")]));
        assert_eq!(addr.full_house_number.as_deref(), Some("12a"));
        assert_eq!(addr.house_number, Some(12));

        let addr = Address::of(&node(&[("addr:housenumber", "a12")]));
        assert_eq!(addr.house_number, None);

        let addr = Address::of(&node(&[]));
        assert_eq!(addr.full_house_number, None);
        assert_eq!(addr.house_number, None);
    }

    #[test]
    fn postcode_spaces_removed() {
        let addr = Address::of(&node(&[("addr:postcode", "1234 AB")]));
        assert_eq!(addr.postcode.as_deref(), Some("1234AB"));
        assert_eq!(normalize_postcode(None), None);
    }

    #[test]
    fn equality_ignores_parsed_number_but_not_city() {
        let a = Address::of(&node(&[("addr:housenumber", "3"), ("addr:postcode", "1234AB")]));
        let b = Address::of(&node(&[("addr:housenumber", "3"), ("addr:postcode", "1234 AB")]));
        assert_eq!(a, b);

        let c = Address::of(&node(&[
            ("addr:housenumber", "3"),
            ("addr:postcode", "1234AB"),
            ("addr:city", "Utrecht"),
        ]));
        assert_ne!(a, c);
    }

    #[test]
    fn presence_needs_an_indexable_part() {
        assert!(Address::is_present(&node(&[("addr:street", "Dorpsstraat")])));
        assert!(!Address::is_present(&node(&[("addr:city", "Utrecht")])));
    }
}
