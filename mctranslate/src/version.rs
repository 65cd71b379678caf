//! One loaded game version and its translators.

use std::collections::HashMap;
use std::sync::Arc;

use mctranslate_db::{BlockFormat, VersionData, VersionNumber};
use mctranslate_nbt::Tag;

use crate::objects::{Block, Properties};
use crate::registry::NumericalRegistry;
use crate::translators::{BlockTranslator, EntityTranslator, Shared};

pub struct Version {
    data: Arc<VersionData>,
    block: BlockTranslator,
    entity: EntityTranslator,
    /// Numeric block id to `(namespace, base_name)`.
    numerical_names: HashMap<i32, (String, String)>,
    block_registry: Arc<NumericalRegistry>,
}

impl Version {
    pub(crate) fn new(shared: Shared) -> Self {
        let data = Arc::clone(&shared.version);
        let mut numerical_names = HashMap::with_capacity(data.numerical_block_map.len());
        for (name, id) in &data.numerical_block_map {
            let (namespace, base_name) = name.split_once(':').unwrap_or(("minecraft", name));
            numerical_names.insert(*id, (namespace.to_string(), base_name.to_string()));
        }
        Self {
            data,
            block_registry: Arc::clone(&shared.block_registry),
            block: BlockTranslator::new(shared.clone()),
            entity: EntityTranslator::new(shared),
            numerical_names,
        }
    }

    pub fn platform(&self) -> &str {
        &self.data.meta.platform
    }

    pub fn version_number(&self) -> VersionNumber {
        self.data.meta.version
    }

    /// 0 when the version predates data versions.
    pub fn data_version(&self) -> i64 {
        self.data.meta.data_version
    }

    pub fn block_format(&self) -> BlockFormat {
        self.data.meta.block_format
    }

    pub fn has_abstract_format(&self) -> bool {
        self.data.meta.block_format.has_abstract_format()
    }

    pub fn data(&self) -> &VersionData {
        &self.data
    }

    pub fn block(&self) -> &BlockTranslator {
        &self.block
    }

    pub fn entity(&self) -> &EntityTranslator {
        &self.entity
    }

    /// The numerical-format block for a numeric id and data value.
    ///
    /// Ids bound in the manager's block registry win over the version's
    /// numerical block map. Ids in neither come back as
    /// `minecraft:numerical[block_data=..,block_id=..]`.
    pub fn ints_to_block(&self, block_id: i32, block_data: i32) -> Block {
        let data_property = ("block_data".to_string(), Tag::Int(block_data));
        if let Some(name) = self.block_registry.private_to_str(block_id) {
            let (namespace, base_name) = name.split_once(':').unwrap_or(("minecraft", name.as_str()));
            return Block::new(namespace, base_name, Properties::from([data_property]));
        }
        match self.numerical_names.get(&block_id) {
            Some((namespace, base_name)) => Block::new(
                namespace.as_str(),
                base_name.as_str(),
                Properties::from([data_property]),
            ),
            None => Block::new(
                "minecraft",
                "numerical",
                Properties::from([
                    data_property,
                    ("block_id".to_string(), Tag::Int(block_id)),
                ]),
            ),
        }
    }

    /// The inverse of [`Version::ints_to_block`]. `None` when the block has
    /// no numeric id or no usable `block_data`.
    pub fn block_to_ints(&self, block: &Block) -> Option<(i32, i32)> {
        let properties = block.properties();
        let block_data = numeric_property(properties.get("block_data")?)?;
        let name = block.namespaced_name();
        if let Some(block_id) = self.block_registry.private_to_int(&name) {
            return Some((block_id, block_data));
        }
        if (block.namespace(), block.base_name()) == ("minecraft", "numerical") {
            return Some((numeric_property(properties.get("block_id")?)?, block_data));
        }
        let block_id = self.data.numerical_block_map.get(&name)?;
        Some((*block_id, block_data))
    }

    /// Whether `namespaced_name` can hold water, or with `always` whether it
    /// is always waterlogged. Versions without the tables answer false.
    pub fn is_waterloggable(&self, namespaced_name: &str, always: bool) -> bool {
        let table = if always {
            &self.data.always_waterlogged
        } else {
            &self.data.waterloggable
        };
        table.as_ref().is_some_and(|names| names.contains(namespaced_name))
    }
}

fn numeric_property(tag: &Tag) -> Option<i32> {
    match tag {
        Tag::String(text) => text.parse().ok(),
        other => other.as_i64().and_then(|v| i32::try_from(v).ok()),
    }
}
