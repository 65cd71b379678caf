//! Loading every version from a rule source and resolving version selectors.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use dashmap::DashMap;
use mctranslate_db::{JsonDirectory, RuleSource, VersionData, VersionNumber};
use mctranslate_metrics::TranslationMetrics;
use thiserror::Error;

use crate::config::Config;
use crate::functions::FunctionRegistry;
use crate::registry::NumericalRegistry;
use crate::translators::Shared;
use crate::version::Version;

pub const UNIVERSAL_PLATFORM: &str = "universal";

/// Below this, a selector with nothing older resolves to the next newer version.
const LEGACY_CUTOFF: VersionNumber = VersionNumber(1, 12, 0);

/// What a caller asks [`TranslationManager::get_version`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    Number(VersionNumber),
    /// The `DataVersion` stored in a world or chunk.
    DataVersion(i64),
}

impl From<VersionNumber> for VersionSelector {
    fn from(number: VersionNumber) -> Self {
        VersionSelector::Number(number)
    }
}

impl From<(u32, u32, u32)> for VersionSelector {
    fn from(number: (u32, u32, u32)) -> Self {
        VersionSelector::Number(number.into())
    }
}

impl From<i64> for VersionSelector {
    fn from(data_version: i64) -> Self {
        VersionSelector::DataVersion(data_version)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Number(number) => write!(f, "version {number}"),
            VersionSelector::DataVersion(data_version) => write!(f, "data version {data_version}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no versions loaded for platform {0:?}")]
    UnknownPlatform(String),
    #[error("no {platform} version matches {selector}")]
    NoMatch {
        platform: String,
        selector: VersionSelector,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("the rule source has no universal version")]
    NoUniversal,
}

/// Owns every loaded version, read-only after construction.
pub struct TranslationManager {
    /// Platform to versions in ascending order.
    versions: BTreeMap<String, BTreeMap<VersionNumber, Arc<Version>>>,
    universal: Arc<Version>,
    resolved: DashMap<(String, VersionSelector), Arc<Version>>,
    metrics: Arc<TranslationMetrics>,
    block_registry: Arc<NumericalRegistry>,
    biome_registry: NumericalRegistry,
}

impl TranslationManager {
    /// Load the JSON rule directory named by `config`, with the built-in code
    /// functions registered.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = JsonDirectory::new(&config.data_dir);
        Self::load(
            &source,
            FunctionRegistry::with_builtins(),
            config.pre_populate_defaults,
            config.summary(),
        )
        .with_context(|| format!("Failed to load rules from {}", config.data_dir.display()))
    }

    /// Load every version `source` lists. Versions that fail to load are
    /// logged and skipped.
    pub fn load(
        source: &dyn RuleSource,
        functions: FunctionRegistry,
        pre_populate_defaults: bool,
        config_summary: String,
    ) -> Result<Self> {
        let metrics = Arc::new(TranslationMetrics::new(config_summary));
        let mut loaded = Vec::new();
        for name in source.version_names().context("Failed to list versions")? {
            let start = Instant::now();
            match source.load_version(&name) {
                Ok(data) => {
                    metrics.record_version_load(start.elapsed());
                    log::info!(
                        "Loaded {} {} from {name}",
                        data.meta.platform,
                        data.meta.version
                    );
                    loaded.push(Arc::new(data));
                }
                Err(err) => log::error!("Failed to load version {name}: {err:#}"),
            }
        }

        let universal_data = loaded
            .iter()
            .filter(|data| data.meta.platform == UNIVERSAL_PLATFORM)
            .max_by_key(|data| data.meta.version)
            .cloned()
            .ok_or(ManagerError::NoUniversal)?;
        let functions = Arc::new(functions);
        let block_registry = Arc::new(NumericalRegistry::new());
        let shared = |data: Arc<VersionData>| Shared {
            version: data,
            universal: Arc::clone(&universal_data),
            functions: Arc::clone(&functions),
            metrics: Arc::clone(&metrics),
            block_registry: Arc::clone(&block_registry),
            pre_populate: pre_populate_defaults,
        };

        let mut versions: BTreeMap<String, BTreeMap<VersionNumber, Arc<Version>>> = BTreeMap::new();
        let mut universal = None;
        for data in loaded {
            let is_universal = Arc::ptr_eq(&data, &universal_data);
            let platform = data.meta.platform.clone();
            let number = data.meta.version;
            let version = Arc::new(Version::new(shared(data)));
            if is_universal {
                universal = Some(Arc::clone(&version));
            }
            if versions
                .entry(platform.clone())
                .or_default()
                .insert(number, version)
                .is_some()
            {
                log::warn!("Duplicate {platform} version {number}, keeping the last one loaded");
            }
        }
        let universal = universal.ok_or(ManagerError::NoUniversal)?;

        Ok(Self {
            versions,
            universal,
            resolved: DashMap::new(),
            metrics,
            block_registry,
            biome_registry: NumericalRegistry::new(),
        })
    }

    /// Platforms with at least one loaded version, sorted.
    pub fn platforms(&self) -> Vec<&str> {
        self.versions.keys().map(String::as_str).collect()
    }

    /// Loaded version numbers of `platform`, ascending.
    pub fn version_numbers(&self, platform: &str) -> Vec<VersionNumber> {
        self.versions
            .get(platform)
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn universal_version(&self) -> &Arc<Version> {
        &self.universal
    }

    pub fn metrics(&self) -> &Arc<TranslationMetrics> {
        &self.metrics
    }

    /// Runtime numeric block ids, checked by every version's
    /// [`Version::ints_to_block`] and [`Version::block_to_ints`] first.
    pub fn block_registry(&self) -> &NumericalRegistry {
        &self.block_registry
    }

    /// Runtime numeric biome ids.
    pub fn biome_registry(&self) -> &NumericalRegistry {
        &self.biome_registry
    }

    /// The loaded version for `selector`, or the nearest one.
    ///
    /// Results are remembered, so the same selector always yields the same
    /// instance.
    pub fn get_version(
        &self,
        platform: &str,
        selector: impl Into<VersionSelector>,
    ) -> Result<Arc<Version>, ResolveError> {
        let selector = selector.into();
        let key = (platform.to_string(), selector);
        if let Some(version) = self.resolved.get(&key) {
            return Ok(Arc::clone(version.value()));
        }

        let versions = self
            .versions
            .get(platform)
            .ok_or_else(|| ResolveError::UnknownPlatform(platform.to_string()))?;
        let version = match selector {
            VersionSelector::Number(number) => resolve_number(versions, number),
            VersionSelector::DataVersion(data_version) => {
                resolve_data_version(versions, data_version)
            }
        }
        .ok_or_else(|| ResolveError::NoMatch {
            platform: platform.to_string(),
            selector,
        })?;

        Ok(Arc::clone(self.resolved.entry(key).or_insert(version).value()))
    }
}

/// Exact match, else the oldest newer version, else the newest older one.
fn resolve_data_version(
    versions: &BTreeMap<VersionNumber, Arc<Version>>,
    data_version: i64,
) -> Option<Arc<Version>> {
    let mut exact = None;
    let mut newer: Option<&Arc<Version>> = None;
    let mut older: Option<&Arc<Version>> = None;
    for version in versions.values() {
        let candidate = version.data_version();
        if candidate == data_version {
            exact = Some(version);
        } else if candidate > data_version {
            if newer.is_none_or(|best| candidate < best.data_version()) {
                newer = Some(version);
            }
        } else if older.is_none_or(|best| candidate >= best.data_version()) {
            older = Some(version);
        }
    }
    exact.or(newer).or(older).cloned()
}

/// Exact match, else the oldest newer patch of the same minor version, else
/// the newest older version, else (for selectors below 1.12) the oldest newer
/// version.
fn resolve_number(
    versions: &BTreeMap<VersionNumber, Arc<Version>>,
    number: VersionNumber,
) -> Option<Arc<Version>> {
    if let Some(version) = versions.get(&number) {
        return Some(Arc::clone(version));
    }
    let mut newer = versions.range((Bound::Excluded(number), Bound::Unbounded));
    if let Some((_, version)) = newer
        .clone()
        .find(|(candidate, _)| candidate.major_minor() == number.major_minor())
    {
        return Some(Arc::clone(version));
    }
    if let Some((_, version)) = versions.range(..number).next_back() {
        return Some(Arc::clone(version));
    }
    if number < LEGACY_CUTOFF {
        return newer.next().map(|(_, version)| Arc::clone(version));
    }
    None
}
