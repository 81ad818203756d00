//! Tag vocabulary shared with the dataset format.
//!
//! These keys are a wire contract: renaming any of them breaks every
//! dataset already tagged from the register.

/// Primary BAG register identifier.
pub const REF_BAG: &str = "ref:bag";
/// Identifier an object carried before the register re-identified it.
pub const REF_BAG_OLD: &str = "ref:bag:old";
/// Provenance date, strict `yyyy-MM-dd`.
pub const SOURCE_DATE: &str = "source:date";
pub const SOURCE: &str = "source";
pub const BUILDING: &str = "building";
pub const CONSTRUCTION: &str = "construction";
pub const START_DATE: &str = "start_date";

pub const ADDR_HOUSENUMBER: &str = "addr:housenumber";
pub const ADDR_STREET: &str = "addr:street";
pub const ADDR_POSTCODE: &str = "addr:postcode";
pub const ADDR_CITY: &str = "addr:city";

/// Width of a canonical BAG identifier.
pub const REF_BAG_WIDTH: usize = 16;

/// `yyyy-MM-dd` in chrono notation.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Left-pad a register identifier with zeros to [`REF_BAG_WIDTH`] characters.
///
/// Only pads: longer or malformed input is returned unchanged, and `None`
/// stays `None`. Applying it twice equals applying it once.
pub fn normalize_ref(raw: Option<&str>) -> Option<String> {
    raw.map(|r| format!("{r:0>width$}", width = REF_BAG_WIDTH))
}

/// True when `raw` is shorter than the canonical width.
pub fn is_short_ref(raw: &str) -> bool {
    raw.chars().count() < REF_BAG_WIDTH
}
