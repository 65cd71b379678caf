//! The mapping rule language.
//!
//! A rule file holds a JSON list of `{"function": <name>, "options": ...}`
//! objects. They are parsed once into [`Rule`], with every SNBT literal and
//! SNBT lookup key already turned into a [`Tag`], so the interpreter never
//! looks at rule names or re-parses text.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

use mctranslate_nbt::{NbtPath, PathKey, Tag, TagKind, from_snbt};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// One mapping instruction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRule")]
pub enum Rule {
    NewBlock(String),
    NewEntity(String),
    NewProperties(BTreeMap<String, Tag>),
    /// Property name to the values that may be carried.
    CarryProperties(BTreeMap<String, HashSet<Tag>>),
    /// Kept in file order; later entries overwrite earlier ones.
    MapProperties(Vec<(String, HashMap<Tag, Vec<Rule>>)>),
    MapBlockName(HashMap<String, Vec<Rule>>),
    Multiblock(Vec<MultiblockPart>),
    WalkInputNbt {
        /// Walk from this path instead of the current position.
        path: Option<NbtPath>,
        node: WalkNode,
    },
    NewNbt(Vec<NewNbt>),
    CarryNbt(CarryNbt),
    MapNbt {
        cases: Option<HashMap<Tag, Vec<Rule>>>,
        default: Vec<Rule>,
    },
    Code(CodeCall),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::NewBlock(_) => "new_block",
            Rule::NewEntity(_) => "new_entity",
            Rule::NewProperties(_) => "new_properties",
            Rule::CarryProperties(_) => "carry_properties",
            Rule::MapProperties(_) => "map_properties",
            Rule::MapBlockName(_) => "map_block_name",
            Rule::Multiblock(_) => "multiblock",
            Rule::WalkInputNbt { .. } => "walk_input_nbt",
            Rule::NewNbt(_) => "new_nbt",
            Rule::CarryNbt(_) => "carry_nbt",
            Rule::MapNbt { .. } => "map_nbt",
            Rule::Code(_) => "code",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiblockPart {
    pub coords: [i32; 3],
    pub functions: Vec<Rule>,
}

/// One level of a `walk_input_nbt` description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalkNode {
    /// Expected kind of the tag at this level. Array element nodes leave it out.
    #[serde(rename = "type", default)]
    pub kind: Option<TagKind>,
    #[serde(default)]
    pub functions: Vec<Rule>,
    #[serde(default)]
    pub keys: HashMap<String, WalkNode>,
    /// Keyed by the stringified index.
    #[serde(default)]
    pub index: HashMap<String, WalkNode>,
    /// Run for children without a node; `None` carries them unchanged.
    #[serde(default)]
    pub nested_default: Option<Vec<Rule>>,
    /// Run instead of descending when the kind does not match.
    #[serde(default)]
    pub self_default: Option<Vec<Rule>>,
}

fn compound_kind() -> TagKind {
    TagKind::Compound
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewNbt {
    #[serde(default)]
    pub outer_name: String,
    #[serde(default = "compound_kind")]
    pub outer_type: TagKind,
    /// `None` means the current walk position, or the root outside a walk.
    #[serde(default)]
    pub path: Option<NbtPath>,
    pub key: PathKey,
    #[serde(deserialize_with = "snbt_tag")]
    pub value: Tag,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CarryNbt {
    #[serde(default)]
    pub outer_name: String,
    #[serde(default = "compound_kind")]
    pub outer_type: TagKind,
    #[serde(default)]
    pub path: Option<NbtPath>,
    #[serde(default)]
    pub key: Option<PathKey>,
    #[serde(rename = "type", default)]
    pub kind: Option<TagKind>,
}

impl Default for CarryNbt {
    fn default() -> Self {
        Self {
            outer_name: String::new(),
            outer_type: TagKind::Compound,
            path: None,
            key: None,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeInput {
    #[serde(alias = "namspace")]
    Namespace,
    BaseName,
    Properties,
    Nbt,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeOutput {
    OutputName,
    OutputType,
    NewProperties,
    NewNbt,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodeCall {
    pub function: String,
    #[serde(default)]
    pub input: Vec<CodeInput>,
    #[serde(default)]
    pub output: Vec<CodeOutput>,
}

/// A tag written as SNBT text, usable as a value or as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Snbt(pub(crate) Tag);

impl<'de> Deserialize<'de> for Snbt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        from_snbt(&text)
            .map(Snbt)
            .map_err(|e| de::Error::custom(format!("invalid snbt {text:?}: {e}")))
    }
}

pub(crate) fn snbt_tag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tag, D::Error> {
    Snbt::deserialize(deserializer).map(|s| s.0)
}

/// A JSON object read as a list of entries in document order.
struct Ordered<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct RawMapNbt {
    #[serde(default)]
    cases: Option<HashMap<Snbt, Vec<Rule>>>,
    #[serde(default)]
    default: Vec<Rule>,
}

#[derive(Deserialize)]
#[serde(tag = "function", rename_all = "snake_case")]
enum RawRule {
    NewBlock {
        options: String,
    },
    NewEntity {
        options: String,
    },
    NewProperties {
        options: BTreeMap<String, Snbt>,
    },
    CarryProperties {
        options: BTreeMap<String, Vec<Snbt>>,
    },
    MapProperties {
        options: Ordered<HashMap<Snbt, Vec<Rule>>>,
    },
    MapBlockName {
        options: HashMap<String, Vec<Rule>>,
    },
    Multiblock {
        options: OneOrMany<MultiblockPart>,
    },
    WalkInputNbt {
        options: WalkNode,
        #[serde(default)]
        path: Option<NbtPath>,
    },
    NewNbt {
        options: OneOrMany<NewNbt>,
    },
    CarryNbt {
        #[serde(default)]
        options: CarryNbt,
    },
    MapNbt {
        options: RawMapNbt,
    },
    Code {
        options: CodeCall,
    },
}

fn untag<V>(map: HashMap<Snbt, V>) -> HashMap<Tag, V> {
    map.into_iter().map(|(k, v)| (k.0, v)).collect()
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        match raw {
            RawRule::NewBlock { options } => Rule::NewBlock(options),
            RawRule::NewEntity { options } => Rule::NewEntity(options),
            RawRule::NewProperties { options } => {
                Rule::NewProperties(options.into_iter().map(|(k, v)| (k, v.0)).collect())
            }
            RawRule::CarryProperties { options } => Rule::CarryProperties(
                options
                    .into_iter()
                    .map(|(k, values)| (k, values.into_iter().map(|v| v.0).collect()))
                    .collect(),
            ),
            RawRule::MapProperties { options } => Rule::MapProperties(
                options
                    .0
                    .into_iter()
                    .map(|(k, cases)| (k, untag(cases)))
                    .collect(),
            ),
            RawRule::MapBlockName { options } => Rule::MapBlockName(options),
            RawRule::Multiblock { options } => Rule::Multiblock(options.into()),
            RawRule::WalkInputNbt { options, path } => Rule::WalkInputNbt {
                path: path.filter(|p| !p.is_empty()),
                node: options,
            },
            RawRule::NewNbt { options } => Rule::NewNbt(options.into()),
            RawRule::CarryNbt { options } => Rule::CarryNbt(options),
            RawRule::MapNbt { options } => Rule::MapNbt {
                cases: options.cases.map(untag),
                default: options.default,
            },
            RawRule::Code { options } => Rule::Code(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctranslate_nbt::PathSegment;

    fn parse(json: &str) -> Vec<Rule> {
        serde_json::from_str(json).expect("valid rules")
    }

    #[test]
    fn test_simple_rules() {
        let rules = parse(
            r#"[
                {"function": "new_block", "options": "universal_minecraft:log"},
                {"function": "new_properties", "options": {"wood_type": "\"oak\"", "age": "3"}},
                {"function": "carry_properties", "options": {"axis": ["\"x\"", "y", "'z'"]}}
            ]"#,
        );
        assert_eq!(rules[0], Rule::NewBlock("universal_minecraft:log".into()));

        let Rule::NewProperties(props) = &rules[1] else {
            panic!("expected new_properties");
        };
        assert_eq!(props["wood_type"], Tag::string("oak"));
        assert_eq!(props["age"], Tag::Int(3));

        let Rule::CarryProperties(carry) = &rules[2] else {
            panic!("expected carry_properties");
        };
        assert_eq!(carry["axis"].len(), 3);
        assert!(carry["axis"].contains(&Tag::string("y")));
    }

    #[test]
    fn test_map_properties_keeps_file_order() {
        let rules = parse(
            r#"[{"function": "map_properties", "options": {
                "variant": {"\"birch\"": [{"function": "new_block", "options": "a:b"}]},
                "axis": {"\"y\"": []}
            }}]"#,
        );
        let Rule::MapProperties(entries) = &rules[0] else {
            panic!("expected map_properties");
        };
        let names: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["variant", "axis"]);
        assert!(entries[0].1.contains_key(&Tag::string("birch")));
    }

    #[test]
    fn test_nbt_rules() {
        let rules = parse(
            r#"[
                {"function": "walk_input_nbt", "path": [["utags", "compound"]], "options": {
                    "type": "compound",
                    "keys": {"CustomName": {"type": "string", "functions": [{"function": "carry_nbt"}]}},
                    "nested_default": []
                }},
                {"function": "new_nbt", "options": {"key": "id", "value": "\"Chest\""}},
                {"function": "map_nbt", "options": {"cases": {"1b": []}}},
                {"function": "multiblock", "options": {"coords": [0, 1, 0], "functions": []}},
                {"function": "code", "options": {"function": "bedrock_sign_2u", "input": ["nbt"], "output": ["new_nbt"]}}
            ]"#,
        );

        let Rule::WalkInputNbt { path, node } = &rules[0] else {
            panic!("expected walk_input_nbt");
        };
        assert_eq!(path.as_deref(), Some(&[PathSegment::new("utags", TagKind::Compound)][..]));
        assert_eq!(node.kind, Some(TagKind::Compound));
        assert_eq!(node.nested_default, Some(Vec::new()));
        assert_eq!(node.self_default, None);
        assert_eq!(
            node.keys["CustomName"].functions,
            vec![Rule::CarryNbt(CarryNbt::default())]
        );

        let Rule::NewNbt(entries) = &rules[1] else {
            panic!("expected new_nbt");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outer_type, TagKind::Compound);
        assert_eq!(entries[0].path, None);
        assert_eq!(entries[0].value, Tag::string("Chest"));

        let Rule::MapNbt { cases, default } = &rules[2] else {
            panic!("expected map_nbt");
        };
        assert!(cases.as_ref().expect("cases").contains_key(&Tag::Byte(1)));
        assert!(default.is_empty());

        assert!(matches!(&rules[3], Rule::Multiblock(parts) if parts[0].coords == [0, 1, 0]));
        assert!(matches!(&rules[4], Rule::Code(call) if call.input == vec![CodeInput::Nbt]));
    }

    #[test]
    fn test_bad_rules_rejected() {
        assert!(serde_json::from_str::<Vec<Rule>>(r#"[{"function": "rotate"}]"#).is_err());
        assert!(
            serde_json::from_str::<Vec<Rule>>(
                r#"[{"function": "new_properties", "options": {"a": "[1, \"x\"]"}}]"#
            )
            .is_err()
        );
    }
}
