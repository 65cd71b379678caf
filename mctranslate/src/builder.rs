//! Rebuilding an output tag tree from paint instructions.

use mctranslate_nbt::{NamedTag, NbtPath, PathKey, PathSegment, Tag, TagKind};

/// Write `value` under `key` at `path` in the tree named `outer_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtEdit {
    pub outer_name: String,
    pub outer_kind: TagKind,
    pub path: NbtPath,
    pub key: PathKey,
    pub value: Tag,
}

impl NbtEdit {
    /// An edit of the usual unnamed compound root.
    pub fn new(path: NbtPath, key: impl Into<PathKey>, value: Tag) -> Self {
        Self {
            outer_name: String::new(),
            outer_kind: TagKind::Compound,
            path,
            key: key.into(),
            value,
        }
    }
}

/// Apply every edit addressed to `(outer_name, outer_kind)` in order, starting
/// from `template` or an empty `outer_kind` tag.
///
/// Missing or mistyped intermediate nodes are replaced by empty nodes of the
/// declared kind. Lists are retyped and padded as needed, so a list holding
/// another kind loses its old elements. Later edits to the same slot win.
pub fn build_nbt(
    outer_name: &str,
    outer_kind: TagKind,
    edits: &[NbtEdit],
    template: Option<&Tag>,
) -> NamedTag {
    let mut root = template.cloned().unwrap_or_else(|| outer_kind.empty());
    for edit in edits
        .iter()
        .filter(|e| e.outer_name == outer_name && e.outer_kind == outer_kind)
    {
        if !apply(&mut root, edit) {
            log::debug!(
                "Dropped nbt edit {}: no {} container at {:?}",
                edit.key,
                edit.value.kind(),
                edit.path
            );
        }
    }
    NamedTag::new(outer_name, root)
}

fn apply(root: &mut Tag, edit: &NbtEdit) -> bool {
    let mut node = root;
    for segment in &edit.path {
        node = match step(node, segment) {
            Some(child) => child,
            None => return false,
        };
    }
    set_leaf(node, &edit.key, edit.value.clone())
}

fn step<'t>(node: &'t mut Tag, segment: &PathSegment) -> Option<&'t mut Tag> {
    match (node, &segment.key) {
        (Tag::Compound(compound), PathKey::Key(key)) => {
            let child = compound
                .entry(key.clone())
                .or_insert_with(|| segment.kind.empty());
            if child.kind() != segment.kind {
                *child = segment.kind.empty();
            }
            Some(child)
        }
        (Tag::List(list), PathKey::Index(index)) => {
            list.pad_to(index + 1, segment.kind);
            list.get_mut(*index)
        }
        _ => None,
    }
}

fn set_leaf(node: &mut Tag, key: &PathKey, value: Tag) -> bool {
    match (node, key, value) {
        (Tag::Compound(compound), PathKey::Key(key), value) => {
            compound.insert(key.clone(), value);
        }
        (Tag::List(list), PathKey::Index(index), value) => {
            list.pad_to(index + 1, value.kind());
            list.set(*index, value);
        }
        (Tag::ByteArray(values), PathKey::Index(index), Tag::Byte(v)) => {
            set_element(values, *index, v)
        }
        (Tag::IntArray(values), PathKey::Index(index), Tag::Int(v)) => {
            set_element(values, *index, v)
        }
        (Tag::LongArray(values), PathKey::Index(index), Tag::Long(v)) => {
            set_element(values, *index, v)
        }
        _ => return false,
    }
    true
}

fn set_element<T: Default>(values: &mut Vec<T>, index: usize, value: T) {
    if values.len() <= index {
        values.resize_with(index + 1, T::default);
    }
    values[index] = value;
}
