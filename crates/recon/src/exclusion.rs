use std::fmt;

use bagcheck_core::GeoObject;
use serde::Serialize;

use crate::config::{ExclusionConfig, TagMatch};

/// Why an object is kept away from automatic fixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Exemption {
    /// Matches an exempt tag, e.g. `building=static_caravan`.
    Tagged { key: String, value: String },
    /// Carries a free-text register note.
    RegisterNote { key: String },
}

impl fmt::Display for Exemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tagged { key, value } => write!(f, "exempt tag {key}={value}"),
            Self::RegisterNote { key } => write!(f, "register note in {key}"),
        }
    }
}

/// Decides which objects are never auto-fixed. Exempt duplicates are still
/// reported.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionPolicy<'a> {
    config: &'a ExclusionConfig,
}

impl<'a> ExclusionPolicy<'a> {
    pub fn new(config: &'a ExclusionConfig) -> Self {
        Self { config }
    }

    /// First matching rule, register notes before tag matches.
    pub fn exemption(&self, object: &GeoObject) -> Option<Exemption> {
        for key in &self.config.note_keys {
            if object.has_tag(key) {
                return Some(Exemption::RegisterNote { key: key.clone() });
            }
        }
        self.config
            .exempt
            .iter()
            .find_map(|rule| matches_rule(object, rule))
    }

    pub fn is_exempt(&self, object: &GeoObject) -> bool {
        self.exemption(object).is_some()
    }
}

fn matches_rule(object: &GeoObject, rule: &TagMatch) -> Option<Exemption> {
    let actual = object.tag(&rule.key)?;
    match &rule.value {
        Some(expected) if expected != actual => None,
        _ => Some(Exemption::Tagged {
            key: rule.key.clone(),
            value: actual.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagcheck_core::{Geometry, ObjectId};

    fn building(value: &str) -> GeoObject {
        GeoObject::new(ObjectId::way(1), Geometry::Way { nodes: vec![1, 2, 3, 1] })
            .with_tag("building", value)
    }

    #[test]
    fn static_caravan_is_exempt_by_default() {
        let config = ExclusionConfig::default();
        let policy = ExclusionPolicy::new(&config);
        assert_eq!(
            policy.exemption(&building("static_caravan")),
            Some(Exemption::Tagged {
                key: "building".into(),
                value: "static_caravan".into()
            })
        );
        assert!(!policy.is_exempt(&building("house")));
    }

    #[test]
    fn register_note_wins_over_tag_rule() {
        let config = ExclusionConfig::default();
        let policy = ExclusionPolicy::new(&config);
        let obj = building("static_caravan").with_tag("note:bag", "standplaats, geen pand");
        assert_eq!(
            policy.exemption(&obj),
            Some(Exemption::RegisterNote { key: "note:bag".into() })
        );
    }

    #[test]
    fn valueless_rule_matches_any_value() {
        let config = ExclusionConfig {
            note_keys: vec![],
            exempt: vec![TagMatch {
                key: "temporary".into(),
                value: None,
            }],
        };
        let policy = ExclusionPolicy::new(&config);
        assert!(policy.is_exempt(&building("house").with_tag("temporary", "yes")));
        assert!(!policy.is_exempt(&building("house")));
    }
}
