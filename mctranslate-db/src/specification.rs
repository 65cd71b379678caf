use std::collections::BTreeMap;

use mctranslate_nbt::{Tag, TagKind};
use serde::Deserialize;

use crate::rules::Snbt;

/// Per-identifier metadata for one version and format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawSpecification")]
pub struct Specification {
    pub default_properties: BTreeMap<String, Tag>,
    /// Declared legal values. Only enumerated by tests, never enforced.
    pub valid_properties: BTreeMap<String, Vec<Tag>>,
    pub nbt: Option<NbtTemplate>,
}

/// The block entity (or entity body) an identifier carries.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtTemplate {
    pub namespace: String,
    pub base_name: String,
    pub outer_name: String,
    pub outer_kind: TagKind,
    pub template: Tag,
}

impl Specification {
    /// Every combination of valid property values, in key order.
    pub fn property_combinations(&self) -> Vec<BTreeMap<String, Tag>> {
        let mut combos = vec![BTreeMap::new()];
        for (key, values) in &self.valid_properties {
            combos = combos
                .into_iter()
                .flat_map(|combo| {
                    values.iter().map(move |value| {
                        let mut next = combo.clone();
                        next.insert(key.clone(), value.clone());
                        next
                    })
                })
                .collect();
        }
        combos
    }
}

#[derive(Deserialize)]
struct RawSpecification {
    #[serde(default)]
    properties: BTreeMap<String, Vec<Snbt>>,
    #[serde(default)]
    defaults: BTreeMap<String, Snbt>,
    #[serde(default)]
    nbt_identifier: Option<(String, String)>,
    #[serde(default)]
    snbt: Option<Snbt>,
    #[serde(default)]
    outer_name: String,
    #[serde(default)]
    outer_type: Option<TagKind>,
}

impl From<RawSpecification> for Specification {
    fn from(raw: RawSpecification) -> Self {
        let nbt = raw.snbt.map(|snbt| {
            let (namespace, base_name) = raw
                .nbt_identifier
                .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));
            NbtTemplate {
                namespace,
                base_name,
                outer_name: raw.outer_name,
                outer_kind: raw.outer_type.unwrap_or(TagKind::Compound),
                template: snbt.0,
            }
        });
        Self {
            default_properties: raw.defaults.into_iter().map(|(k, v)| (k, v.0)).collect(),
            valid_properties: raw
                .properties
                .into_iter()
                .map(|(k, values)| (k, values.into_iter().map(|v| v.0).collect()))
                .collect(),
            nbt,
        }
    }
}
