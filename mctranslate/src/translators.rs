//! Per-version translator facades.
//!
//! They look up the input specification and rules, run the interpreter, and
//! contain its failures: a missing specification hands the input back
//! unchanged, an interpreter error hands it back flagged as needing more
//! data. Block results that depend only on the block are memoised.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use dashmap::{DashMap, DashSet};
use mctranslate_db::{FormatKey, NotFound, Rule, Specification, SpecificationDatabase, VersionData};
use mctranslate_metrics::TranslationMetrics;

use crate::functions::FunctionRegistry;
use crate::lookup::BlockLookup;
use crate::objects::{Block, BlockCoordinates, BlockEntity, Entity, Record};
use crate::registry::NumericalRegistry;
use crate::translate::{OutputKind, TranslateRequest, Translation, translate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ToUniversal,
    FromUniversal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::ToUniversal => "to universal",
            Direction::FromUniversal => "from universal",
        })
    }
}

/// What both facades of one version share.
#[derive(Clone)]
pub(crate) struct Shared {
    pub version: Arc<VersionData>,
    pub universal: Arc<VersionData>,
    pub functions: Arc<FunctionRegistry>,
    pub metrics: Arc<TranslationMetrics>,
    pub block_registry: Arc<NumericalRegistry>,
    pub pre_populate: bool,
}

impl Shared {
    fn version_name(&self) -> String {
        format!("{} {}", self.version.meta.platform, self.version.meta.version)
    }
}

struct Found<'a> {
    spec: &'a Specification,
    rules: &'a [Rule],
    output_version: &'a VersionData,
    force_blockstate: bool,
}

/// Core shared by the block and entity facades.
struct Facade {
    shared: Shared,
    kind: OutputKind,
    /// `(identifier, direction, format)` already reported missing.
    warned: DashSet<(String, Direction, FormatKey)>,
}

impl Facade {
    fn new(shared: Shared, kind: OutputKind) -> Self {
        Self {
            shared,
            kind,
            warned: DashSet::new(),
        }
    }

    fn mode(&self) -> &'static str {
        match self.kind {
            OutputKind::Block => "block",
            OutputKind::Entity => "entity",
        }
    }

    fn database<'a>(&self, version: &'a VersionData) -> &'a SpecificationDatabase {
        match self.kind {
            OutputKind::Block => &version.block,
            OutputKind::Entity => &version.entity,
        }
    }

    fn find(
        &self,
        direction: Direction,
        namespace: &str,
        base_name: &str,
        force_blockstate: bool,
    ) -> Result<Found<'_>, NotFound> {
        let format = self.shared.version.format_key(force_blockstate);
        let native = self.database(&self.shared.version);
        let universal = self.database(&self.shared.universal);
        Ok(match direction {
            Direction::ToUniversal => Found {
                spec: native.specification(format, namespace, base_name)?,
                rules: native.mapping_to_universal(format, namespace, base_name)?,
                output_version: &self.shared.universal,
                force_blockstate: true,
            },
            Direction::FromUniversal => Found {
                spec: universal.specification(FormatKey::Blockstate, namespace, base_name)?,
                rules: native.mapping_from_universal(format, namespace, base_name)?,
                output_version: &self.shared.version,
                force_blockstate,
            },
        })
    }

    fn report_missing(&self, input: &Record, direction: Direction, error: &NotFound, quirk: bool) {
        self.shared.metrics.record_missing_specification();
        let key = (input_name(input), direction, error.format);
        if !self.warned.insert(key) {
            return;
        }
        if quirk {
            log::debug!(
                "Probably just a quirk block {input} {direction} in {}.",
                self.shared.version_name()
            );
        } else {
            log::warn!(
                "Could not find translation information for {} {input} {direction} in {}: {error}. If this is not a vanilla {} ignore this message",
                self.mode(),
                self.shared.version_name(),
                self.mode()
            );
        }
    }

    fn run(
        &self,
        input: Record,
        direction: Direction,
        found: Found<'_>,
        lookup: Option<&dyn BlockLookup>,
        extra_input: Option<&BlockEntity>,
        location: Option<BlockCoordinates>,
    ) -> Translation {
        let start = Instant::now();
        let result = translate(&TranslateRequest {
            input: &input,
            input_spec: found.spec,
            rules: found.rules,
            output_version: found.output_version,
            force_blockstate: found.force_blockstate,
            functions: &self.shared.functions,
            lookup,
            extra_input,
            pre_populate_defaults: self.shared.pre_populate,
            block_location: location,
        });
        self.shared.metrics.record_translation(start.elapsed());

        let translation = match result {
            Ok(translation) => translation,
            Err(err) => {
                log::error!(
                    "Error converting {} {input} {direction} in {}: {err}",
                    self.mode(),
                    self.shared.version_name()
                );
                self.shared.metrics.record_failure();
                Translation::unchanged(input, extra_input.cloned(), true)
            }
        };
        if translation.extra_needed {
            self.shared.metrics.record_extra_needed();
        }
        translation
    }
}

fn input_name(input: &Record) -> String {
    match input {
        Record::Block(block) => block.namespaced_name(),
        Record::Entity(entity) => entity.namespaced_name(),
    }
}

/// Options for one block translation.
#[derive(Clone, Copy, Default)]
pub struct BlockContext<'a> {
    /// Access to neighbouring blocks. Without it, rules that need the world
    /// set `extra_needed` instead.
    pub lookup: Option<&'a dyn BlockLookup>,
    /// Use the blockstate layout of a numerical version.
    pub force_blockstate: bool,
    /// The block entity of the input block, if the caller has it.
    pub extra_input: Option<&'a BlockEntity>,
    pub location: Option<BlockCoordinates>,
}

pub struct BlockTranslator {
    facade: Facade,
    /// Indexed by [`cache_slot`].
    cache: [DashMap<Block, Arc<Translation>>; 4],
}

fn cache_slot(direction: Direction, force_blockstate: bool) -> usize {
    (direction as usize) * 2 + usize::from(force_blockstate)
}

impl BlockTranslator {
    pub(crate) fn new(shared: Shared) -> Self {
        Self {
            facade: Facade::new(shared, OutputKind::Block),
            cache: Default::default(),
        }
    }

    /// Translate a native block of this version to the universal format.
    pub fn to_universal(&self, block: &Block, context: BlockContext<'_>) -> Arc<Translation> {
        self.translate(Direction::ToUniversal, block, context)
    }

    /// Translate a universal block to this version.
    pub fn from_universal(&self, block: &Block, context: BlockContext<'_>) -> Arc<Translation> {
        self.translate(Direction::FromUniversal, block, context)
    }

    fn translate(&self, direction: Direction, block: &Block, context: BlockContext<'_>) -> Arc<Translation> {
        let metrics = &self.facade.shared.metrics;
        let cache = &self.cache[cache_slot(direction, context.force_blockstate)];
        let memoisable = context.extra_input.is_none();
        if memoisable {
            if let Some(hit) = cache.get(block) {
                metrics.record_cache_hit();
                return Arc::clone(hit.value());
            }
            metrics.record_cache_miss();
        }

        let input = Record::Block(block.clone());
        let found = match self.facade.find(
            direction,
            block.namespace(),
            block.base_name(),
            context.force_blockstate,
        ) {
            Ok(found) => found,
            Err(err) => {
                let quirk = direction == Direction::FromUniversal
                    && block.namespace() == "minecraft"
                    && block.properties().keys().eq(["block_data"]);
                self.facade.report_missing(&input, direction, &err, quirk);
                return Arc::new(Translation::unchanged(
                    input,
                    context.extra_input.cloned(),
                    false,
                ));
            }
        };

        let translation = Arc::new(self.facade.run(
            input,
            direction,
            found,
            context.lookup,
            context.extra_input,
            context.location,
        ));
        if memoisable && translation.cacheable {
            cache.insert(block.clone(), Arc::clone(&translation));
        }
        translation
    }

    /// Namespaces with a block specification, sorted.
    pub fn namespaces(&self, force_blockstate: bool) -> Vec<&str> {
        let version = &self.facade.shared.version;
        version.block.namespaces(version.format_key(force_blockstate))
    }

    pub fn base_names(&self, namespace: &str, force_blockstate: bool) -> Vec<&str> {
        let version = &self.facade.shared.version;
        version
            .block
            .base_names(version.format_key(force_blockstate), namespace)
    }

    pub fn specification(
        &self,
        namespace: &str,
        base_name: &str,
        force_blockstate: bool,
    ) -> Result<&Specification, NotFound> {
        let version = &self.facade.shared.version;
        version
            .block
            .specification(version.format_key(force_blockstate), namespace, base_name)
    }

    /// Number of memoised results.
    pub fn cached(&self) -> usize {
        self.cache.iter().map(DashMap::len).sum()
    }

    #[cfg(test)]
    pub(crate) fn reported_missing(&self) -> usize {
        self.facade.warned.len()
    }
}

/// Entity translations read the entity's own tree, so nothing is memoised.
pub struct EntityTranslator {
    facade: Facade,
}

impl EntityTranslator {
    pub(crate) fn new(shared: Shared) -> Self {
        Self {
            facade: Facade::new(shared, OutputKind::Entity),
        }
    }

    pub fn to_universal(&self, entity: &Entity, force_blockstate: bool) -> Translation {
        self.translate(Direction::ToUniversal, entity, force_blockstate)
    }

    pub fn from_universal(&self, entity: &Entity, force_blockstate: bool) -> Translation {
        self.translate(Direction::FromUniversal, entity, force_blockstate)
    }

    fn translate(&self, direction: Direction, entity: &Entity, force_blockstate: bool) -> Translation {
        let input = Record::Entity(entity.clone());
        match self.facade.find(
            direction,
            &entity.namespace,
            &entity.base_name,
            force_blockstate,
        ) {
            Ok(found) => self.facade.run(input, direction, found, None, None, None),
            Err(err) => {
                self.facade.report_missing(&input, direction, &err, false);
                Translation::unchanged(input, None, false)
            }
        }
    }

    pub fn namespaces(&self, force_blockstate: bool) -> Vec<&str> {
        let version = &self.facade.shared.version;
        version.entity.namespaces(version.format_key(force_blockstate))
    }

    pub fn base_names(&self, namespace: &str, force_blockstate: bool) -> Vec<&str> {
        let version = &self.facade.shared.version;
        version
            .entity
            .base_names(version.format_key(force_blockstate), namespace)
    }
}
