//! Where version tables come from.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::database::SpecificationDatabase;
use crate::version::{VersionData, VersionMeta};

/// A store of rule databases, one entry per version.
pub trait RuleSource: Send + Sync {
    /// Names of every version the source can load.
    fn version_names(&self) -> Result<Vec<String>>;
    fn load_version(&self, name: &str) -> Result<VersionData>;
}

/// Uncompressed JSON tree:
///
/// ```text
/// <root>/versions/<name>/__init__.json
///                       /block.json
///                       /entity.json
///                       /__numerical_block_map__.json
///                       /__waterloggable__.json
///                       /__always_waterlogged__.json
/// ```
///
/// Only `__init__.json` is required.
pub struct JsonDirectory {
    root: PathBuf,
}

impl JsonDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if path.is_file() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}

impl RuleSource for JsonDirectory {
    fn version_names(&self) -> Result<Vec<String>> {
        let dir = self.versions_dir();
        let entries =
            fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
            if entry.path().join("__init__.json").is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_version(&self, name: &str) -> Result<VersionData> {
        let dir = self.versions_dir().join(name);
        let meta: VersionMeta = read_json(&dir.join("__init__.json"))?;
        let mut data = VersionData::new(meta);

        data.block = read_optional::<SpecificationDatabase>(&dir.join("block.json"))?
            .unwrap_or_default();
        data.entity = read_optional::<SpecificationDatabase>(&dir.join("entity.json"))?
            .unwrap_or_default();
        data.numerical_block_map =
            read_optional(&dir.join("__numerical_block_map__.json"))?.unwrap_or_default();
        data.waterloggable = read_optional::<HashSet<String>>(&dir.join("__waterloggable__.json"))?;
        data.always_waterlogged =
            read_optional::<HashSet<String>>(&dir.join("__always_waterlogged__.json"))?;

        if data.meta.block_format.has_abstract_format() && data.numerical_block_map.is_empty() {
            log::warn!("Version {name} has a numerical block format but no numerical block map");
        }
        Ok(data)
    }
}
