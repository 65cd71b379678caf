//! Named functions for the `code` rule.
//!
//! A `code` rule hands the function the inputs it lists (namespace, base
//! name, properties, the raw tag tree, location) and maps whatever comes back
//! onto the output in the order of its `output` list.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mctranslate_nbt::{PathSegment, Tag, TagKind};
use thiserror::Error;

use crate::builder::NbtEdit;
use crate::objects::{BlockCoordinates, Properties};
use crate::raw_text::{raw_text_to_section, section_to_raw_text, section_to_raw_text_lines};

#[derive(Debug, Clone, PartialEq)]
pub enum CodeValue {
    Str(String),
    Properties(Properties),
    Nbt(Tag),
    Location(BlockCoordinates),
    Edits(Vec<NbtEdit>),
}

impl CodeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            CodeValue::Str(_) => "string",
            CodeValue::Properties(_) => "properties",
            CodeValue::Nbt(_) => "nbt",
            CodeValue::Location(_) => "location",
            CodeValue::Edits(_) => "nbt edits",
        }
    }
}

#[derive(Debug, Error)]
pub enum CodeError {
    #[error("code function {0:?} is not registered")]
    Unknown(String),
    #[error("code function {function:?} expected {expected} as argument {index}")]
    Argument {
        function: String,
        index: usize,
        expected: &'static str,
    },
    #[error("code function {function:?} returned {found} for {slot}")]
    Output {
        function: String,
        slot: String,
        found: &'static str,
    },
}

pub trait CodeFunction: Send + Sync {
    fn call(&self, args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError>;
}

impl<F> CodeFunction for F
where
    F: Fn(&[CodeValue]) -> Result<Vec<CodeValue>, CodeError> + Send + Sync,
{
    fn call(&self, args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
        self(args)
    }
}

/// Functions reachable from `code` rules, by name.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn CodeFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the functions the shipped rule data calls.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("bedrock_sign_2u", bedrock_sign_2u);
        registry.register("bedrock_sign_fu", bedrock_sign_fu);
        registry.register("bedrock_sign_2u_120", bedrock_sign_2u_120);
        registry.register("bedrock_cmd_custom_name_2u", bedrock_cmd_custom_name_2u);
        registry.register("bedrock_cmd_custom_name_fu", bedrock_cmd_custom_name_fu);
        registry.register("banner_pattern_2u", banner_pattern_2u);
        registry.register("bedrock_skull_rotation_2u", bedrock_skull_rotation_2u);
        registry.register("bedrock_moving_block_pos_2u", bedrock_moving_block_pos_2u);
        registry.register("bedrock_moving_block_pos_fu", bedrock_moving_block_pos_fu);
        registry.register("bedrock_chest_fu", bedrock_chest_fu);
        registry.register(
            "bedrock_chest_connection_other_left",
            bedrock_chest_connection_other_left,
        );
        registry.register(
            "bedrock_chest_connection_other_right",
            bedrock_chest_connection_other_right,
        );
        registry.register(
            "bedrock_chest_connection_other_right_120",
            bedrock_chest_connection_other_right_120,
        );
        registry
    }

    /// Add or replace a function.
    pub fn register(&mut self, name: impl Into<String>, function: impl CodeFunction + 'static) {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn call(&self, name: &str, args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
        self.functions
            .get(name)
            .ok_or_else(|| CodeError::Unknown(name.to_string()))?
            .call(args)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

struct Args<'a> {
    function: &'static str,
    values: &'a [CodeValue],
}

impl<'a> Args<'a> {
    fn new(function: &'static str, values: &'a [CodeValue]) -> Self {
        Self { function, values }
    }

    fn error(&self, index: usize, expected: &'static str) -> CodeError {
        CodeError::Argument {
            function: self.function.to_string(),
            index,
            expected,
        }
    }

    fn nbt(&self, index: usize) -> Result<&'a Tag, CodeError> {
        match self.values.get(index) {
            Some(CodeValue::Nbt(tag)) => Ok(tag),
            _ => Err(self.error(index, "nbt")),
        }
    }

    fn properties(&self, index: usize) -> Result<&'a Properties, CodeError> {
        match self.values.get(index) {
            Some(CodeValue::Properties(properties)) => Ok(properties),
            _ => Err(self.error(index, "properties")),
        }
    }

    fn location(&self, index: usize) -> Result<BlockCoordinates, CodeError> {
        match self.values.get(index) {
            Some(CodeValue::Location(location)) => Ok(*location),
            _ => Err(self.error(index, "location")),
        }
    }
}

fn child<'t>(tag: &'t Tag, key: &str) -> Option<&'t Tag> {
    tag.as_compound().and_then(|c| c.get(key))
}

fn int_child(tag: &Tag, key: &str) -> Option<i32> {
    match child(tag, key) {
        Some(Tag::Int(v)) => Some(*v),
        _ => None,
    }
}

fn utags() -> Vec<PathSegment> {
    vec![PathSegment::new("utags", TagKind::Compound)]
}

fn edits(edits: Vec<NbtEdit>) -> Result<Vec<CodeValue>, CodeError> {
    Ok(vec![CodeValue::Edits(edits)])
}

fn properties(pairs: &[(&str, &str)]) -> Result<Vec<CodeValue>, CodeError> {
    Ok(vec![CodeValue::Properties(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Tag::string(*v)))
            .collect(),
    )])
}

/// Split the single newline separated `Text` into `utags.Text1..Text4`.
fn bedrock_sign_2u(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("bedrock_sign_2u", args).nbt(0)?;
    let text = child(nbt, "Text").and_then(Tag::as_str).unwrap_or("");
    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.resize(lines.len().max(4), "");
    edits(
        (1..=4)
            .map(|line| {
                let key = format!("Text{line}");
                NbtEdit::new(utags(), key.as_str(), Tag::string(lines[line - 1]))
            })
            .collect(),
    )
}

/// Join `utags.Text1..Text4` back into one `Text`.
fn bedrock_sign_fu(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("bedrock_sign_fu", args).nbt(0)?;
    let utags = child(nbt, "utags").filter(|t| t.kind() == TagKind::Compound);
    let lines: Vec<&str> = (1..=4)
        .map(|line| {
            utags
                .and_then(|u| child(u, &format!("Text{line}")))
                .and_then(Tag::as_str)
                .unwrap_or("")
        })
        .collect();
    edits(vec![NbtEdit::new(Vec::new(), "Text", Tag::string(lines.join("\n")))])
}

/// Front and back `Text` of a 1.20 sign, one JSON text line per message.
fn bedrock_sign_2u_120(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("bedrock_sign_2u_120", args).nbt(0)?;
    let mut out = Vec::new();
    for (side, universal_side) in [("FrontText", "front_text"), ("BackText", "back_text")] {
        let text = child(nbt, side)
            .and_then(|side| child(side, "Text"))
            .and_then(Tag::as_str)
            .unwrap_or("");
        if text.is_empty() {
            continue;
        }
        let mut path = utags();
        path.push(PathSegment::new(universal_side, TagKind::Compound));
        path.push(PathSegment::new("messages", TagKind::List));
        for (index, line) in section_to_raw_text_lines(text).into_iter().enumerate() {
            out.push(NbtEdit::new(path.clone(), index, Tag::string(line)));
        }
    }
    edits(out)
}

/// Section-sign `CustomName` of a command block to JSON text.
fn bedrock_cmd_custom_name_2u(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("bedrock_cmd_custom_name_2u", args).nbt(0)?;
    let raw_text = match child(nbt, "CustomName").and_then(Tag::as_str) {
        Some(text) if !text.is_empty() => section_to_raw_text(text),
        _ => "\"\"".to_string(),
    };
    edits(vec![NbtEdit::new(utags(), "CustomName", Tag::string(raw_text))])
}

fn bedrock_cmd_custom_name_fu(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("bedrock_cmd_custom_name_fu", args).nbt(0)?;
    let text = child(nbt, "utags")
        .and_then(|utags| child(utags, "CustomName"))
        .and_then(Tag::as_str)
        .map(raw_text_to_section)
        .unwrap_or_default();
    edits(vec![NbtEdit::new(Vec::new(), "CustomName", Tag::string(text))])
}

/// Bedrock stores banner pattern colours inverted.
fn banner_pattern_2u(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("banner_pattern_2u", args).nbt(0)?;
    let Some(patterns) = child(nbt, "Patterns").and_then(Tag::as_list) else {
        return edits(Vec::new());
    };
    edits(
        patterns
            .iter()
            .enumerate()
            .filter_map(|(index, pattern)| {
                let color = int_child(pattern, "Color")?;
                let mut path = utags();
                path.push(PathSegment::new("Patterns", TagKind::List));
                path.push(PathSegment::new(index, TagKind::Compound));
                Some(NbtEdit::new(path, "Color", Tag::Int(15 - color)))
            })
            .collect(),
    )
}

/// Continuous `Rotation` in degrees to the sixteen step `rotation` property.
fn bedrock_skull_rotation_2u(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let nbt = Args::new("bedrock_skull_rotation_2u", args).nbt(0)?;
    let rotation = match child(nbt, "Rotation") {
        Some(Tag::Float(degrees)) => ((f64::from(*degrees) / 22.5).floor() as i64).rem_euclid(16),
        _ => 0,
    };
    Ok(vec![CodeValue::Properties(Properties::from([(
        "rotation".to_string(),
        Tag::string(rotation.to_string()),
    )]))])
}

/// Absolute piston position to an offset from the moving block.
fn bedrock_moving_block_pos_2u(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let args = Args::new("bedrock_moving_block_pos_2u", args);
    let nbt = args.nbt(0)?;
    let (x, y, z) = args.location(1)?;
    let piston = (
        int_child(nbt, "pistonPosX"),
        int_child(nbt, "pistonPosY"),
        int_child(nbt, "pistonPosZ"),
    );
    let (Some(px), Some(py), Some(pz)) = piston else {
        return edits(Vec::new());
    };
    edits(vec![
        NbtEdit::new(utags(), "pistonPosdX", Tag::Int(px - x)),
        NbtEdit::new(utags(), "pistonPosdY", Tag::Int(py - y)),
        NbtEdit::new(utags(), "pistonPosdZ", Tag::Int(pz - z)),
    ])
}

fn bedrock_moving_block_pos_fu(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let args = Args::new("bedrock_moving_block_pos_fu", args);
    let nbt = args.nbt(0)?;
    let (x, y, z) = args.location(1)?;
    let Some(utags) = child(nbt, "utags") else {
        return edits(Vec::new());
    };
    let offset = (
        int_child(utags, "pistonPosdX"),
        int_child(utags, "pistonPosdY"),
        int_child(utags, "pistonPosdZ"),
    );
    let (Some(dx), Some(dy), Some(dz)) = offset else {
        return edits(Vec::new());
    };
    edits(vec![
        NbtEdit::new(Vec::new(), "pistonPosX", Tag::Int(dx + x)),
        NbtEdit::new(Vec::new(), "pistonPosY", Tag::Int(dy + y)),
        NbtEdit::new(Vec::new(), "pistonPosZ", Tag::Int(dz + z)),
    ])
}

/// Pair a double chest with the neighbour on its left.
fn bedrock_chest_fu(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let args = Args::new("bedrock_chest_fu", args);
    let properties = args.properties(0)?;
    let (x, _, z) = args.location(1)?;
    let pair = match properties.get("facing").and_then(Tag::as_str) {
        Some("north") => (x - 1, z),
        Some("south") => (x + 1, z),
        Some("west") => (x, z + 1),
        Some("east") => (x, z - 1),
        _ => return edits(Vec::new()),
    };
    edits(vec![
        NbtEdit::new(Vec::new(), "pairlead", Tag::Byte(1)),
        NbtEdit::new(Vec::new(), "pairx", Tag::Int(pair.0)),
        NbtEdit::new(Vec::new(), "pairz", Tag::Int(pair.1)),
    ])
}

/// The facing property and the offset of the paired chest, if this chest
/// leads the pair.
fn chest_pair<'a>(
    args: &Args<'a>,
    facing_key: &str,
) -> Result<Option<(&'a Tag, i32, i32)>, CodeError> {
    let nbt = args.nbt(0)?;
    let properties = args.properties(1)?;
    let (x, _, z) = args.location(2)?;

    let leads = matches!(child(nbt, "pairlead"), Some(Tag::Byte(1)));
    let pair = int_child(nbt, "pairx").zip(int_child(nbt, "pairz"));
    Ok(match (leads, pair, properties.get(facing_key)) {
        (true, Some((px, pz)), Some(facing)) => Some((facing, px - x, pz - z)),
        _ => None,
    })
}

fn bedrock_chest_connection_other_left(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let args = Args::new("bedrock_chest_connection_other_left", args);
    let pair = chest_pair(&args, "facing_direction")?
        .and_then(|(facing, dx, dz)| Some((facing.as_i64()?, dx, dz)));
    match pair {
        Some((2, -1, 0) | (3, 1, 0) | (4, 0, 1) | (5, 0, -1)) => properties(&[("type", "left")]),
        _ => properties(&[]),
    }
}

fn bedrock_chest_connection_other_right(args: &[CodeValue]) -> Result<Vec<CodeValue>, CodeError> {
    let args = Args::new("bedrock_chest_connection_other_right", args);
    let pair = chest_pair(&args, "facing_direction")?
        .and_then(|(facing, dx, dz)| Some((facing.as_i64()?, dx, dz)));
    match pair {
        Some((2, 1, 0) | (3, -1, 0) | (4, 0, -1) | (5, 0, 1)) => {
            properties(&[("connection", "right")])
        }
        _ => properties(&[]),
    }
}

/// Same as [`bedrock_chest_connection_other_right`] for 1.20 chests, which
/// name their facing by cardinal direction.
fn bedrock_chest_connection_other_right_120(
    args: &[CodeValue],
) -> Result<Vec<CodeValue>, CodeError> {
    let args = Args::new("bedrock_chest_connection_other_right_120", args);
    let pair = chest_pair(&args, "minecraft:cardinal_direction")?
        .and_then(|(facing, dx, dz)| Some((facing.as_str()?, dx, dz)));
    match pair {
        Some(("north", 1, 0) | ("south", -1, 0) | ("west", 0, -1) | ("east", 0, 1)) => {
            properties(&[("connection", "right")])
        }
        _ => properties(&[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctranslate_nbt::from_snbt;

    fn nbt(text: &str) -> CodeValue {
        CodeValue::Nbt(from_snbt(text).expect("valid snbt"))
    }

    fn returned_edits(values: Vec<CodeValue>) -> Vec<NbtEdit> {
        match values.into_iter().next() {
            Some(CodeValue::Edits(edits)) => edits,
            other => panic!("expected edits, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        let err = registry.call("missing", &[]).expect_err("not registered");
        assert!(matches!(err, CodeError::Unknown(name) if name == "missing"));
    }

    #[test]
    fn test_register_closure() {
        let mut registry = FunctionRegistry::new();
        registry.register(
            "shout",
            |args: &[CodeValue]| -> Result<Vec<CodeValue>, CodeError> {
                match args.first() {
                    Some(CodeValue::Str(s)) => Ok(vec![CodeValue::Str(s.to_uppercase())]),
                    _ => Ok(Vec::new()),
                }
            },
        );
        assert!(registry.contains("shout"));
        let out = registry
            .call("shout", &[CodeValue::Str("stone".into())])
            .expect("call");
        assert_eq!(out, vec![CodeValue::Str("STONE".into())]);
    }

    #[test]
    fn test_sign_text_round_trip() {
        let registry = FunctionRegistry::with_builtins();
        let split = returned_edits(
            registry
                .call("bedrock_sign_2u", &[nbt("{Text:\"one\\ntwo\"}")])
                .expect("sign to universal"),
        );
        assert_eq!(split.len(), 4);
        assert_eq!(split[0].key.to_string(), "Text1");
        assert_eq!(split[0].value, Tag::string("one"));
        assert_eq!(split[1].value, Tag::string("two"));
        assert_eq!(split[3].value, Tag::string(""));
        assert_eq!(split[0].path, utags());

        let joined = returned_edits(
            registry
                .call(
                    "bedrock_sign_fu",
                    &[nbt("{utags:{Text1:\"one\",Text2:\"two\"}}")],
                )
                .expect("sign from universal"),
        );
        assert_eq!(joined, vec![NbtEdit::new(Vec::new(), "Text", Tag::string("one\ntwo\n\n"))]);
    }

    #[test]
    fn test_skull_rotation() {
        let registry = FunctionRegistry::with_builtins();
        let out = registry
            .call("bedrock_skull_rotation_2u", &[nbt("{Rotation:-22.5f}")])
            .expect("rotation");
        assert_eq!(
            out,
            vec![CodeValue::Properties(Properties::from([(
                "rotation".to_string(),
                Tag::string("15")
            )]))]
        );
    }

    #[test]
    fn test_banner_colours_inverted() {
        let registry = FunctionRegistry::with_builtins();
        let out = returned_edits(
            registry
                .call(
                    "banner_pattern_2u",
                    &[nbt("{Patterns:[{Color:0},{Pattern:\"x\"},{Color:14}]}")],
                )
                .expect("banner"),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, Tag::Int(15));
        assert_eq!(out[1].value, Tag::Int(1));
        assert_eq!(out[1].path[2], PathSegment::new(2usize, TagKind::Compound));
    }

    #[test]
    fn test_moving_block_offsets() {
        let registry = FunctionRegistry::with_builtins();
        let location = CodeValue::Location((10, 64, -3));
        let out = returned_edits(
            registry
                .call(
                    "bedrock_moving_block_pos_2u",
                    &[nbt("{pistonPosX:11,pistonPosY:64,pistonPosZ:-5}"), location.clone()],
                )
                .expect("to universal"),
        );
        let values: Vec<Tag> = out.iter().map(|e| e.value.clone()).collect();
        assert_eq!(values, vec![Tag::Int(1), Tag::Int(0), Tag::Int(-2)]);

        let back = returned_edits(
            registry
                .call(
                    "bedrock_moving_block_pos_fu",
                    &[nbt("{utags:{pistonPosdX:1,pistonPosdY:0,pistonPosdZ:-2}}"), location],
                )
                .expect("from universal"),
        );
        let values: Vec<Tag> = back.iter().map(|e| e.value.clone()).collect();
        assert_eq!(values, vec![Tag::Int(11), Tag::Int(64), Tag::Int(-5)]);
    }

    #[test]
    fn test_chest_pairing() {
        let registry = FunctionRegistry::with_builtins();
        let facing = Properties::from([("facing".to_string(), Tag::string("north"))]);
        let out = returned_edits(
            registry
                .call(
                    "bedrock_chest_fu",
                    &[CodeValue::Properties(facing), CodeValue::Location((5, 0, 5))],
                )
                .expect("chest"),
        );
        assert_eq!(out[1].value, Tag::Int(4));
        assert_eq!(out[2].value, Tag::Int(5));

        let bedrock = Properties::from([("facing_direction".to_string(), Tag::Int(2))]);
        let out = registry
            .call(
                "bedrock_chest_connection_other_left",
                &[
                    nbt("{pairlead:1b,pairx:4,pairz:5}"),
                    CodeValue::Properties(bedrock),
                    CodeValue::Location((5, 0, 5)),
                ],
            )
            .expect("connection");
        assert_eq!(
            out,
            vec![CodeValue::Properties(Properties::from([(
                "type".to_string(),
                Tag::string("left")
            )]))]
        );
    }

    #[test]
    fn test_sign_120_messages() {
        let registry = FunctionRegistry::with_builtins();
        let out = returned_edits(
            registry
                .call(
                    "bedrock_sign_2u_120",
                    &[nbt("{FrontText:{Text:\"§cHot\\nplain\"},BackText:{Text:\"\"}}")],
                )
                .expect("sign to universal"),
        );
        assert_eq!(out.len(), 2);
        let mut path = utags();
        path.push(PathSegment::new("front_text", TagKind::Compound));
        path.push(PathSegment::new("messages", TagKind::List));
        assert_eq!(
            out[0],
            NbtEdit::new(path.clone(), 0usize, Tag::string(r#"[{"text":"Hot","color":"red"}]"#))
        );
        assert_eq!(out[1], NbtEdit::new(path, 1usize, Tag::string(r#"["plain"]"#)));

        let back_only = returned_edits(
            registry
                .call("bedrock_sign_2u_120", &[nbt("{BackText:{Text:\"x\"}}")])
                .expect("sign to universal"),
        );
        assert_eq!(back_only.len(), 1);
        assert_eq!(back_only[0].path[1], PathSegment::new("back_text", TagKind::Compound));
    }

    #[test]
    fn test_command_block_name() {
        let registry = FunctionRegistry::with_builtins();
        let named = returned_edits(
            registry
                .call("bedrock_cmd_custom_name_2u", &[nbt("{CustomName:\"§lBoss\"}")])
                .expect("name to universal"),
        );
        assert_eq!(
            named,
            vec![NbtEdit::new(
                utags(),
                "CustomName",
                Tag::string(r#"[{"text":"Boss","bold":true}]"#)
            )]
        );

        let unnamed = returned_edits(
            registry
                .call("bedrock_cmd_custom_name_2u", &[nbt("{}")])
                .expect("name to universal"),
        );
        assert_eq!(unnamed[0].value, Tag::string("\"\""));

        let back = returned_edits(
            registry
                .call(
                    "bedrock_cmd_custom_name_fu",
                    &[nbt(r#"{utags:{CustomName:'[{"text":"Boss","bold":true}]'}}"#)],
                )
                .expect("name from universal"),
        );
        assert_eq!(back, vec![NbtEdit::new(Vec::new(), "CustomName", Tag::string("§lBoss"))]);

        let missing = returned_edits(
            registry
                .call("bedrock_cmd_custom_name_fu", &[nbt("{utags:{}}")])
                .expect("name from universal"),
        );
        assert_eq!(missing[0].value, Tag::string(""));
    }

    #[test]
    fn test_chest_connection_right() {
        let registry = FunctionRegistry::with_builtins();
        let connection = |function: &str, facing: Tag, pair: &str| {
            let facing_key = if function.ends_with("_120") {
                "minecraft:cardinal_direction"
            } else {
                "facing_direction"
            };
            registry
                .call(
                    function,
                    &[
                        nbt(pair),
                        CodeValue::Properties(Properties::from([(facing_key.to_string(), facing)])),
                        CodeValue::Location((5, 0, 5)),
                    ],
                )
                .expect("connection")
        };
        let right = vec![CodeValue::Properties(Properties::from([(
            "connection".to_string(),
            Tag::string("right"),
        )]))];
        let none = vec![CodeValue::Properties(Properties::new())];

        let legacy = "bedrock_chest_connection_other_right";
        let cardinal = "bedrock_chest_connection_other_right_120";
        let east_pair = "{pairlead:1b,pairx:6,pairz:5}";
        assert_eq!(connection(legacy, Tag::Int(2), east_pair), right);
        assert_eq!(connection(cardinal, Tag::string("north"), east_pair), right);
        assert_eq!(
            connection(cardinal, Tag::string("east"), "{pairlead:1b,pairx:5,pairz:6}"),
            right
        );
        assert_eq!(
            connection(cardinal, Tag::string("north"), "{pairlead:1b,pairx:4,pairz:5}"),
            none
        );
        assert_eq!(
            connection(cardinal, Tag::string("north"), "{pairlead:0b,pairx:6,pairz:5}"),
            none
        );
        assert_eq!(connection(cardinal, Tag::Int(2), east_pair), none);
    }

    #[test]
    fn test_bad_arguments() {
        let registry = FunctionRegistry::with_builtins();
        let err = registry
            .call("bedrock_chest_fu", &[CodeValue::Str("x".into())])
            .expect_err("wrong argument");
        assert!(matches!(err, CodeError::Argument { index: 0, .. }));
    }
}
