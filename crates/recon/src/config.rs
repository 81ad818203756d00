use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BagError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation policy: building taxonomy plus exclusion rules.
///
/// Every section has built-in defaults, so an empty TOML document is a
/// valid config.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub building: BuildingTaxonomy,
    #[serde(default)]
    pub exclusion: ExclusionConfig,
}

// ---------------------------------------------------------------------------
// Building taxonomy
// ---------------------------------------------------------------------------

const DEFAULT_SPECIFIC: &[&str] = &[
    "barn",
    "bungalow",
    "bunker",
    "castle",
    "cathedral",
    "chapel",
    "church",
    "civic",
    "college",
    "dormitory",
    "farm",
    "farm_auxiliary",
    "fire_station",
    "garage",
    "garages",
    "government",
    "greenhouse",
    "hangar",
    "hospital",
    "hotel",
    "hut",
    "kindergarten",
    "monastery",
    "mosque",
    "prison",
    "school",
    "service",
    "shed",
    "stable",
    "stadium",
    "storage_tank",
    "supermarket",
    "synagogue",
    "temple",
    "train_station",
    "university",
    "warehouse",
];

const DEFAULT_GENERIC: &[&str] = &[
    "construction",
    "yes",
    "house",
    "apartments",
    "office",
    "industrial",
    "retail",
];

/// Building values split into two closed sets.
///
/// `specific` values were chosen by a mapper and beat the register value;
/// `generic` values are what the register hands out and lose to the new
/// copy. Anything in neither set is left for manual handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingTaxonomy {
    /// The generic affirmative value. A new copy carrying only this never
    /// overrides the original.
    #[serde(default = "default_affirmative")]
    pub affirmative: String,
    #[serde(default = "default_specific")]
    pub specific: BTreeSet<String>,
    #[serde(default = "default_generic")]
    pub generic: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingClass {
    Specific,
    Generic,
    Unclassified,
}

fn default_affirmative() -> String {
    "yes".into()
}

fn default_specific() -> BTreeSet<String> {
    DEFAULT_SPECIFIC.iter().map(|s| s.to_string()).collect()
}

fn default_generic() -> BTreeSet<String> {
    DEFAULT_GENERIC.iter().map(|s| s.to_string()).collect()
}

impl Default for BuildingTaxonomy {
    fn default() -> Self {
        Self {
            affirmative: default_affirmative(),
            specific: default_specific(),
            generic: default_generic(),
        }
    }
}

impl BuildingTaxonomy {
    pub fn classify(&self, value: &str) -> BuildingClass {
        if self.specific.contains(value) {
            BuildingClass::Specific
        } else if self.generic.contains(value) {
            BuildingClass::Generic
        } else {
            BuildingClass::Unclassified
        }
    }

    pub fn is_affirmative(&self, value: &str) -> bool {
        value == self.affirmative
    }
}

// ---------------------------------------------------------------------------
// Exclusion
// ---------------------------------------------------------------------------

/// A tag that marks an object as exempt. Without `value` any value matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TagMatch {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExclusionConfig {
    /// Keys holding a free-text register note. Any value exempts.
    #[serde(default = "default_note_keys")]
    pub note_keys: Vec<String>,
    /// Static or temporary structures the register models differently.
    #[serde(default = "default_exempt")]
    pub exempt: Vec<TagMatch>,
}

fn default_exempt() -> Vec<TagMatch> {
    vec![TagMatch {
        key: "building".into(),
        value: Some("static_caravan".into()),
    }]
}

fn default_note_keys() -> Vec<String> {
    vec!["note:bag".into()]
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            note_keys: default_note_keys(),
            exempt: default_exempt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconcileConfig {
    pub fn from_toml(input: &str) -> Result<Self, BagError> {
        let config: ReconcileConfig =
            toml::from_str(input).map_err(|e| BagError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, BagError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| BagError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn to_toml(&self) -> Result<String, BagError> {
        toml::to_string_pretty(self).map_err(|e| BagError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), BagError> {
        let building = &self.building;

        if building.affirmative.trim().is_empty() {
            return Err(BagError::ConfigValidation(
                "building.affirmative must not be empty".into(),
            ));
        }

        for (list, values) in [("specific", &building.specific), ("generic", &building.generic)] {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(BagError::ConfigValidation(format!(
                    "building.{list} contains an empty value"
                )));
            }
        }

        // specific and generic must be disjoint
        let overlap: Vec<&str> = building
            .specific
            .intersection(&building.generic)
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(BagError::ConfigValidation(format!(
                "building values listed as both specific and generic: {}",
                overlap.join(", ")
            )));
        }

        if building.specific.contains(&building.affirmative) {
            return Err(BagError::ConfigValidation(format!(
                "affirmative value '{}' cannot be specific",
                building.affirmative
            )));
        }

        for rule in &self.exclusion.exempt {
            if rule.key.trim().is_empty() {
                return Err(BagError::ConfigValidation(
                    "exclusion.exempt entry with empty key".into(),
                ));
            }
        }
        if self.exclusion.note_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(BagError::ConfigValidation(
                "exclusion.note_keys contains an empty key".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
