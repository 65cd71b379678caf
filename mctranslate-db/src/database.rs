//! Specification and mapping tables for one record kind of one version.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::rules::Rule;
use crate::specification::Specification;

/// Which of a version's two block layouts a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKey {
    Numerical,
    Blockstate,
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormatKey::Numerical => "numerical",
            FormatKey::Blockstate => "blockstate",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Specification,
    ToUniversal,
    FromUniversal,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Specification => "specification",
            Table::ToUniversal => "mapping to universal",
            Table::FromUniversal => "mapping from universal",
        })
    }
}

/// The identifier has no entry in the requested table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{table} for {format} {namespace}:{base_name} does not exist")]
pub struct NotFound {
    pub table: Table,
    pub format: FormatKey,
    pub namespace: String,
    pub base_name: String,
}

type ByName<T> = HashMap<String, HashMap<String, T>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatTables {
    #[serde(default)]
    pub specification: ByName<Specification>,
    #[serde(default)]
    pub to_universal: ByName<Vec<Rule>>,
    #[serde(default)]
    pub from_universal: ByName<Vec<Rule>>,
}

/// Read-only after loading, shared across every translation of the version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SpecificationDatabase {
    formats: HashMap<FormatKey, FormatTables>,
}

impl SpecificationDatabase {
    pub fn new(formats: HashMap<FormatKey, FormatTables>) -> Self {
        Self { formats }
    }

    fn find<'a, T>(
        &'a self,
        table: Table,
        format: FormatKey,
        namespace: &str,
        base_name: &str,
        pick: impl FnOnce(&'a FormatTables) -> &'a ByName<T>,
    ) -> Result<&'a T, NotFound> {
        self.formats
            .get(&format)
            .map(pick)
            .and_then(|names| names.get(namespace))
            .and_then(|names| names.get(base_name))
            .ok_or_else(|| NotFound {
                table,
                format,
                namespace: namespace.to_string(),
                base_name: base_name.to_string(),
            })
    }

    pub fn specification(
        &self,
        format: FormatKey,
        namespace: &str,
        base_name: &str,
    ) -> Result<&Specification, NotFound> {
        self.find(Table::Specification, format, namespace, base_name, |t| {
            &t.specification
        })
    }

    pub fn mapping_to_universal(
        &self,
        format: FormatKey,
        namespace: &str,
        base_name: &str,
    ) -> Result<&[Rule], NotFound> {
        self.find(Table::ToUniversal, format, namespace, base_name, |t| {
            &t.to_universal
        })
        .map(Vec::as_slice)
    }

    pub fn mapping_from_universal(
        &self,
        format: FormatKey,
        namespace: &str,
        base_name: &str,
    ) -> Result<&[Rule], NotFound> {
        self.find(Table::FromUniversal, format, namespace, base_name, |t| {
            &t.from_universal
        })
        .map(Vec::as_slice)
    }

    /// Namespaces with a specification, sorted.
    pub fn namespaces(&self, format: FormatKey) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .formats
            .get(&format)
            .map(|t| t.specification.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Base names with a specification in `namespace`, sorted.
    pub fn base_names(&self, format: FormatKey, namespace: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .formats
            .get(&format)
            .and_then(|t| t.specification.get(namespace))
            .map(|names| names.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> SpecificationDatabase {
        serde_json::from_str(
            r#"{
                "blockstate": {
                    "specification": {"minecraft": {"stone": {}, "air": {}}, "other": {"thing": {}}},
                    "to_universal": {"minecraft": {"stone": [{"function": "new_block", "options": "universal_minecraft:stone"}]}},
                    "from_universal": {}
                }
            }"#,
        )
        .expect("valid database")
    }

    #[test]
    fn test_lookups() {
        let db = database();
        assert!(db.specification(FormatKey::Blockstate, "minecraft", "stone").is_ok());
        let rules = db
            .mapping_to_universal(FormatKey::Blockstate, "minecraft", "stone")
            .expect("mapping");
        assert_eq!(rules.len(), 1);

        let err = db
            .mapping_from_universal(FormatKey::Blockstate, "minecraft", "stone")
            .expect_err("no mapping");
        assert_eq!(
            err.to_string(),
            "mapping from universal for blockstate minecraft:stone does not exist"
        );
        assert!(db.specification(FormatKey::Numerical, "minecraft", "stone").is_err());
    }

    #[test]
    fn test_listing() {
        let db = database();
        assert_eq!(db.namespaces(FormatKey::Blockstate), vec!["minecraft", "other"]);
        assert_eq!(db.base_names(FormatKey::Blockstate, "minecraft"), vec!["air", "stone"]);
        assert!(db.namespaces(FormatKey::Numerical).is_empty());
    }
}
