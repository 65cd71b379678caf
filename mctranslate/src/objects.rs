//! Blocks, entities and block entities.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use mctranslate_nbt::{NamedTag, Tag, from_snbt};
use thiserror::Error;

pub type Properties = BTreeMap<String, Tag>;
pub type BlockCoordinates = (i32, i32, i32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockstateError {
    #[error("blockstate {0:?} has no base name")]
    MissingName(String),
    #[error("blockstate {0:?} has an unterminated property list")]
    Unterminated(String),
    #[error("property {0:?} is not key=value")]
    Property(String),
    #[error("property {key:?} has an invalid value: {source}")]
    Value {
        key: String,
        source: mctranslate_nbt::SnbtError,
    },
}

/// A block state, optionally stacked with extra layers (for example the
/// water in a waterlogged block).
///
/// Immutable once built; the canonical blockstate string is computed on first
/// use and kept.
#[derive(Clone)]
pub struct Block {
    namespace: String,
    base_name: String,
    properties: Properties,
    extra_blocks: Vec<Block>,
    blockstate: OnceLock<String>,
}

impl Block {
    pub fn new(
        namespace: impl Into<String>,
        base_name: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            base_name: base_name.into(),
            properties,
            extra_blocks: Vec::new(),
            blockstate: OnceLock::new(),
        }
    }

    /// Parse `namespace:base_name[key=value,...]`.
    ///
    /// The namespace defaults to `minecraft`. Values are SNBT, except that a
    /// bare word (`north`, `true`) is always read as a string.
    pub fn parse_blockstate(text: &str) -> Result<Self, BlockstateError> {
        let text = text.trim();
        let (name, props) = match text.find('[') {
            Some(open) => {
                let inner = text[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| BlockstateError::Unterminated(text.to_string()))?;
                (&text[..open], Some(inner))
            }
            None => (text, None),
        };
        let (namespace, base_name) = name.split_once(':').unwrap_or(("minecraft", name));
        if base_name.is_empty() {
            return Err(BlockstateError::MissingName(text.to_string()));
        }

        let mut properties = Properties::new();
        for pair in props.into_iter().flat_map(split_properties) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| BlockstateError::Property(pair.to_string()))?;
            properties.insert(key.trim().to_string(), property_value(key.trim(), value.trim())?);
        }
        Ok(Self::new(namespace, base_name, properties))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// `namespace:base_name`
    pub fn namespaced_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn extra_blocks(&self) -> &[Block] {
        &self.extra_blocks
    }

    /// The block without its extra layers.
    pub fn base_block(&self) -> Block {
        Block::new(
            self.namespace.clone(),
            self.base_name.clone(),
            self.properties.clone(),
        )
    }

    /// Stack `layer` (and any layers it carries) on top of this block.
    pub fn with_layer(&self, layer: &Block) -> Block {
        let mut out = self.base_block();
        out.extra_blocks = self.extra_blocks.clone();
        out.extra_blocks.push(layer.base_block());
        out.extra_blocks.extend(layer.extra_blocks.iter().cloned());
        out
    }

    /// Replace all extra layers.
    pub fn with_layers(&self, layers: impl IntoIterator<Item = Block>) -> Block {
        let mut out = self.base_block();
        for layer in layers {
            out.extra_blocks.push(layer.base_block());
            out.extra_blocks.extend(layer.extra_blocks);
        }
        out
    }

    /// Drop every extra layer equal to `layer`.
    pub fn without_layer(&self, layer: &Block) -> Block {
        self.base_block()
            .with_layers(self.extra_blocks.iter().filter(|b| *b != layer).cloned())
    }

    /// Drop the extra layer at `index`, if present.
    pub fn remove_layer(&self, index: usize) -> Block {
        self.base_block().with_layers(
            self.extra_blocks
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, b)| b.clone()),
        )
    }

    /// Canonical string: sorted SNBT properties followed by each extra layer
    /// in braces.
    pub fn blockstate(&self) -> &str {
        self.blockstate.get_or_init(|| {
            let mut out = self.base_blockstate();
            for extra in &self.extra_blocks {
                out.push('{');
                out.push_str(&extra.base_blockstate());
                out.push('}');
            }
            out
        })
    }

    fn base_blockstate(&self) -> String {
        let mut out = self.namespaced_name();
        if !self.properties.is_empty() {
            let props: Vec<String> = self
                .properties
                .iter()
                .map(|(k, v)| format!("{k}={}", v.to_snbt()))
                .collect();
            out.push('[');
            out.push_str(&props.join(","));
            out.push(']');
        }
        out
    }
}

/// Split on commas outside quoted strings.
fn split_properties(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ',' => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            None => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn property_value(key: &str, value: &str) -> Result<Tag, BlockstateError> {
    let bare = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && value.starts_with(|c: char| c.is_ascii_alphabetic());
    if bare {
        return Ok(Tag::string(value));
    }
    from_snbt(value).map_err(|source| BlockstateError::Value {
        key: key.to_string(),
        source,
    })
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace
            && self.base_name == other.base_name
            && self.properties == other.properties
            && self.extra_blocks == other.extra_blocks
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.base_name.hash(state);
        self.properties.hash(state);
        self.extra_blocks.hash(state);
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.blockstate())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.blockstate())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub namespace: String,
    pub base_name: String,
    pub location: (f64, f64, f64),
    pub nbt: NamedTag,
}

impl Entity {
    pub fn new(
        namespace: impl Into<String>,
        base_name: impl Into<String>,
        location: (f64, f64, f64),
        nbt: NamedTag,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            base_name: base_name.into(),
            location,
            nbt,
        }
    }

    pub fn namespaced_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.location;
        write!(f, "{}:{} at ({x}, {y}, {z})", self.namespace, self.base_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntity {
    pub namespace: String,
    pub base_name: String,
    pub location: BlockCoordinates,
    pub nbt: NamedTag,
}

impl BlockEntity {
    pub fn new(
        namespace: impl Into<String>,
        base_name: impl Into<String>,
        location: BlockCoordinates,
        nbt: NamedTag,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            base_name: base_name.into(),
            location,
            nbt,
        }
    }

    pub fn namespaced_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }
}

/// The input or output of a translation.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Block(Block),
    Entity(Entity),
}

impl Record {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Record::Block(block) => Some(block),
            Record::Entity(_) => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Record::Entity(entity) => Some(entity),
            Record::Block(_) => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Block(block) => write!(f, "{block}"),
            Record::Entity(entity) => write!(f, "{entity}"),
        }
    }
}

impl From<Block> for Record {
    fn from(block: Block) -> Self {
        Record::Block(block)
    }
}

impl From<Entity> for Record {
    fn from(entity: Entity) -> Self {
        Record::Entity(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn water() -> Block {
        Block::parse_blockstate("minecraft:water[level=\"0\"]").expect("valid blockstate")
    }

    #[test]
    fn test_parse_blockstate() {
        let block = Block::parse_blockstate("oak_log[axis=y, age=3, lit=true]").expect("valid blockstate");
        assert_eq!(block.namespace(), "minecraft");
        assert_eq!(block.base_name(), "oak_log");
        assert_eq!(block.properties()["axis"], Tag::string("y"));
        assert_eq!(block.properties()["age"], Tag::Int(3));
        assert_eq!(block.properties()["lit"], Tag::string("true"));
        assert_eq!(block.blockstate(), "minecraft:oak_log[age=3,axis=\"y\",lit=\"true\"]");

        let sign = Block::parse_blockstate(r#"minecraft:sign[text="a,b",rotation=4,note='x\',y']"#)
            .expect("valid blockstate");
        assert_eq!(sign.properties().len(), 3);
        assert_eq!(sign.properties()["text"], Tag::string("a,b"));
        assert_eq!(sign.properties()["note"], Tag::string("x',y"));
        assert_eq!(sign.properties()["rotation"], Tag::Int(4));

        assert!(Block::parse_blockstate("minecraft:").is_err());
        assert!(Block::parse_blockstate("stone[a=1").is_err());
        assert!(Block::parse_blockstate("stone[a]").is_err());
    }

    #[test]
    fn test_equality_ignores_property_order() {
        let mut a = Properties::new();
        a.insert("x".into(), Tag::string("1"));
        a.insert("y".into(), Tag::string("2"));
        let b: Properties = a.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect();

        let first = Block::new("minecraft", "thing", a);
        let second = Block::new("minecraft", "thing", b);
        assert_eq!(first, second);

        let mut set = HashSet::new();
        set.insert(first.clone());
        assert!(set.contains(&second));
        assert_ne!(first, first.with_layer(&water()));
    }

    #[test]
    fn test_layers_stay_one_deep() {
        let stone = Block::parse_blockstate("minecraft:stone").expect("valid blockstate");
        let chest = Block::parse_blockstate("minecraft:chest[facing=north]").expect("valid blockstate");

        let wet_chest = chest.with_layer(&water());
        let stacked = stone.with_layer(&wet_chest);
        assert_eq!(stacked.extra_blocks().len(), 2);
        assert!(stacked.extra_blocks().iter().all(|b| b.extra_blocks().is_empty()));
        assert_eq!(
            stacked.blockstate(),
            "minecraft:stone{minecraft:chest[facing=\"north\"]}{minecraft:water[level=\"0\"]}"
        );

        assert_eq!(stacked.remove_layer(0).extra_blocks(), &[water()]);
        assert_eq!(stacked.without_layer(&water()).extra_blocks(), &[chest.clone()]);
        assert_eq!(stacked.base_block(), stone);
    }
}
