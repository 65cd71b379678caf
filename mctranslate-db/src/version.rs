//! Version metadata and the loaded tables of one version.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::database::{FormatKey, SpecificationDatabase};

/// A `major.minor.patch` game version. Orders lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(from = "[u32; 3]")]
pub struct VersionNumber(pub u32, pub u32, pub u32);

impl VersionNumber {
    pub fn major_minor(&self) -> (u32, u32) {
        (self.0, self.1)
    }
}

impl From<[u32; 3]> for VersionNumber {
    fn from([a, b, c]: [u32; 3]) -> Self {
        Self(a, b, c)
    }
}

impl From<(u32, u32, u32)> for VersionNumber {
    fn from((a, b, c): (u32, u32, u32)) -> Self {
        Self(a, b, c)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// How a version stores blocks natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockFormat {
    /// Numeric id and numeric data value.
    Numerical,
    /// Namespaced id with a numeric data value.
    PseudoNumerical,
    /// Namespaced id with string properties.
    Blockstate,
    /// Namespaced id with properties of any tag kind.
    NbtBlockstate,
}

impl BlockFormat {
    /// Whether the version also has an abstract blockstate layout on top of
    /// its numeric one.
    pub fn has_abstract_format(self) -> bool {
        matches!(self, BlockFormat::Numerical | BlockFormat::PseudoNumerical)
    }
}

/// The `__init__.json` of a version directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionMeta {
    pub platform: String,
    pub version: VersionNumber,
    #[serde(default)]
    pub data_version: i64,
    pub block_format: BlockFormat,
}

/// Everything loaded for one version.
#[derive(Debug, Clone)]
pub struct VersionData {
    pub meta: VersionMeta,
    pub block: SpecificationDatabase,
    pub entity: SpecificationDatabase,
    /// `"namespace:base_name"` to numeric block id.
    pub numerical_block_map: HashMap<String, i32>,
    pub waterloggable: Option<HashSet<String>>,
    pub always_waterlogged: Option<HashSet<String>>,
}

impl VersionData {
    pub fn new(meta: VersionMeta) -> Self {
        Self {
            meta,
            block: SpecificationDatabase::default(),
            entity: SpecificationDatabase::default(),
            numerical_block_map: HashMap::new(),
            waterloggable: None,
            always_waterlogged: None,
        }
    }

    /// `numerical` when the version has an abstract layout and the caller did
    /// not ask for blockstate, `blockstate` otherwise.
    pub fn format_key(&self, force_blockstate: bool) -> FormatKey {
        if !force_blockstate && self.meta.block_format.has_abstract_format() {
            FormatKey::Numerical
        } else {
            FormatKey::Blockstate
        }
    }
}
