//! `walk_input_nbt`: descending the input tag tree.
//!
//! Each level runs its own `functions` first. If the tag found there has the
//! expected kind, every child is visited with the node registered for its key
//! or index, or with `nested_default` when there is none. A kind mismatch runs
//! `self_default` instead of descending. Nothing here writes to the tree; all
//! output goes through paint instructions in the state.

use std::borrow::Cow;

use mctranslate_db::{CarryNbt, WalkNode};
use mctranslate_nbt::{PathKey, PathSegment, Tag};

use crate::translate::{Frame, Interpreter, State, TranslateError};

pub(crate) fn walk(
    interpreter: &Interpreter<'_>,
    node: &WalkNode,
    frame: &Frame<'_>,
    state: &mut State,
) -> Result<(), TranslateError> {
    let cursor = frame.cursor.ok_or(TranslateError::NoWalkPosition {
        rule: "walk_input_nbt",
    })?;
    interpreter.run(&node.functions, frame, state)?;

    if node.kind.is_some_and(|kind| kind != cursor.value.kind()) {
        return match &node.self_default {
            Some(rules) => interpreter.run(rules, frame, state),
            // Nothing to carry the root under.
            None if cursor.path.is_empty() => Ok(()),
            None => interpreter.carry_nbt(&CarryNbt::default(), frame, state),
        };
    }

    let children: Vec<(PathKey, Cow<'_, Tag>)> = match cursor.value {
        Tag::Compound(compound) => compound
            .iter()
            .map(|(key, child)| (PathKey::Key(key.clone()), Cow::Borrowed(child)))
            .collect(),
        Tag::List(list) => list
            .iter()
            .enumerate()
            .map(|(index, child)| (PathKey::Index(index), Cow::Borrowed(child)))
            .collect(),
        Tag::ByteArray(values) => elements(values.iter().map(|v| Tag::Byte(*v))),
        Tag::IntArray(values) => elements(values.iter().map(|v| Tag::Int(*v))),
        Tag::LongArray(values) => elements(values.iter().map(|v| Tag::Long(*v))),
        _ => return Ok(()),
    };

    for (key, child) in &children {
        let mut path = cursor.path.to_vec();
        path.push(PathSegment::new(key.clone(), child.kind()));
        let child_frame = frame.at(&path, child);

        let child_node = match key {
            PathKey::Key(key) => node.keys.get(key),
            PathKey::Index(index) => node.index.get(&index.to_string()),
        };
        match (child_node, &node.nested_default) {
            (Some(child_node), _) => walk(interpreter, child_node, &child_frame, state)?,
            (None, Some(rules)) => interpreter.run(rules, &child_frame, state)?,
            (None, None) => {
                log::debug!("Unaccounted data at {}", describe(&path));
                interpreter.carry_nbt(&CarryNbt::default(), &child_frame, state)?;
            }
        }
    }
    Ok(())
}

fn elements<'t>(values: impl Iterator<Item = Tag>) -> Vec<(PathKey, Cow<'t, Tag>)> {
    values
        .enumerate()
        .map(|(index, value)| (PathKey::Index(index), Cow::Owned(value)))
        .collect()
}

/// `utags(compound)/Items(list)/0(compound)`
pub(crate) fn describe(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.iter()
        .map(|segment| format!("{}({})", segment.key, segment.kind))
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctranslate_db::Rule;
    use mctranslate_nbt::{NamedTag, NbtPath, TagKind, from_snbt};

    use crate::builder::NbtEdit;
    use crate::functions::FunctionRegistry;
    use crate::objects::Block;
    use crate::translate::Subject;

    fn walk_rules(json: &str, nbt: &str) -> Result<State, TranslateError> {
        let rules: Vec<Rule> = serde_json::from_str(json).expect("valid rules");
        let block = Block::parse_blockstate("minecraft:chest").expect("valid blockstate");
        let nbt = NamedTag::new("", from_snbt(nbt).expect("valid snbt"));
        let functions = FunctionRegistry::new();
        let interpreter = Interpreter::new(&functions, None);
        let mut state = State::default();
        interpreter.run(
            &rules,
            &Frame::new(Subject::Block(&block), Some(&nbt), (0, 0, 0)),
            &mut state,
        )?;
        Ok(state)
    }

    fn segment(key: &str, kind: TagKind) -> PathSegment {
        PathSegment::new(key, kind)
    }

    #[test]
    fn test_keys_and_implicit_carry() {
        let state = walk_rules(
            r#"[{"function": "walk_input_nbt", "options": {"type": "compound", "keys": {
                "CustomName": {"type": "string", "functions": [
                    {"function": "carry_nbt", "options": {"path": [["utags", "compound"]]}}
                ]}
            }}}]"#,
            "{CustomName:\"box\",Lock:\"key\"}",
        )
        .expect("walk");

        assert!(!state.cacheable);
        assert_eq!(
            state.nbt,
            vec![
                NbtEdit::new(
                    vec![segment("utags", TagKind::Compound)],
                    "CustomName",
                    Tag::string("box")
                ),
                NbtEdit::new(Vec::new(), "Lock", Tag::string("key")),
            ]
        );
    }

    #[test]
    fn test_nested_default_replaces_carry() {
        let state = walk_rules(
            r#"[{"function": "walk_input_nbt", "options": {"type": "compound", "nested_default": [
                {"function": "new_nbt", "options": {"key": "seen", "value": "1b"}}
            ]}}]"#,
            "{a:1,b:2}",
        )
        .expect("walk");
        let paths: Vec<NbtPath> = state.nbt.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec![segment("a", TagKind::Int)],
                vec![segment("b", TagKind::Int)],
            ]
        );
    }

    #[test]
    fn test_kind_mismatch_runs_self_default() {
        let state = walk_rules(
            r#"[{"function": "walk_input_nbt", "options": {"type": "compound", "keys": {
                "Items": {"type": "list", "self_default": [
                    {"function": "new_nbt", "options": {"path": [], "key": "broken", "value": "1b"}}
                ], "nested_default": []}
            }, "nested_default": []}}]"#,
            "{Items:\"not a list\"}",
        )
        .expect("walk");
        assert_eq!(state.nbt, vec![NbtEdit::new(Vec::new(), "broken", Tag::Byte(1))]);
    }

    #[test]
    fn test_index_and_arrays() {
        let state = walk_rules(
            r#"[{"function": "walk_input_nbt", "options": {"type": "compound", "keys": {
                "pos": {"type": "int_array", "index": {
                    "1": {"functions": [{"function": "carry_nbt", "options": {"key": "y"}}]}
                }, "nested_default": []},
                "Items": {"type": "list", "index": {
                    "0": {"type": "compound", "functions": [{"function": "map_nbt", "options": {
                        "cases": {"{Slot:0b}": [{"function": "new_properties", "options": {"first": "\"slot0\""}}]}
                    }}], "nested_default": []}
                }, "nested_default": []}
            }}}]"#,
            "{pos:[I;4,5,6],Items:[{Slot:0b},{Slot:1b}]}",
        )
        .expect("walk");
        assert_eq!(
            state.nbt,
            vec![NbtEdit::new(
                vec![segment("pos", TagKind::IntArray)],
                "y",
                Tag::Int(5)
            )]
        );
        assert_eq!(state.properties["first"], Tag::string("slot0"));
    }

    #[test]
    fn test_custom_path() {
        let state = walk_rules(
            r#"[
                {"function": "walk_input_nbt", "path": [["utags", "compound"]], "options": {
                    "type": "compound", "keys": {
                        "Lock": {"type": "string", "functions": [{"function": "carry_nbt", "options": {"type": "string"}}]}
                    }, "nested_default": []
                }},
                {"function": "walk_input_nbt", "path": [["missing", "compound"]], "options": {"type": "compound"}}
            ]"#,
            "{utags:{Lock:\"key\",Other:1}}",
        )
        .expect("walk");
        assert_eq!(
            state.nbt,
            vec![NbtEdit::new(
                vec![segment("utags", TagKind::Compound)],
                "Lock",
                Tag::string("key")
            )]
        );
    }

    #[test]
    fn test_carry_retypes_and_rejects_root() {
        let state = walk_rules(
            r#"[{"function": "walk_input_nbt", "options": {"type": "compound", "keys": {
                "Count": {"type": "byte", "functions": [{"function": "carry_nbt", "options": {"type": "int"}}]}
            }, "nested_default": []}}]"#,
            "{Count:3b}",
        )
        .expect("walk");
        assert_eq!(state.nbt[0].value, Tag::Int(3));

        let err = walk_rules(
            r#"[{"function": "walk_input_nbt", "options": {"type": "compound", "functions": [
                {"function": "carry_nbt"}
            ]}}]"#,
            "{}",
        )
        .expect_err("root carry");
        assert!(matches!(err, TranslateError::RootCarry));
    }

    #[test]
    fn test_map_nbt_outside_walk() {
        let err = walk_rules(r#"[{"function": "map_nbt", "options": {"default": []}}]"#, "{}")
            .expect_err("no walk position");
        assert!(matches!(err, TranslateError::NoWalkPosition { rule: "map_nbt" }));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&[]), "<root>");
        assert_eq!(
            describe(&[segment("utags", TagKind::Compound), PathSegment::new(0usize, TagKind::Int)]),
            "utags(compound)/0(int)"
        );
    }
}
