//! Typed paths into a tag tree.
//!
//! Rule files spell a path as `[["utags", "compound"], [0, "list"]]`: each
//! step names the child (compound key or list index) and the kind the child is
//! expected to have.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tag::{Tag, TagKind};

/// A compound key or a list/array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathKey {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(i) => write!(f, "{i}"),
            PathKey::Key(k) => f.write_str(k),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_string())
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(PathKey, TagKind)", into = "(PathKey, TagKind)")]
pub struct PathSegment {
    pub key: PathKey,
    pub kind: TagKind,
}

impl PathSegment {
    pub fn new(key: impl Into<PathKey>, kind: TagKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

impl From<(PathKey, TagKind)> for PathSegment {
    fn from((key, kind): (PathKey, TagKind)) -> Self {
        Self { key, kind }
    }
}

impl From<PathSegment> for (PathKey, TagKind) {
    fn from(segment: PathSegment) -> Self {
        (segment.key, segment.kind)
    }
}

pub type NbtPath = Vec<PathSegment>;

/// Follow `path` from `root`.
///
/// Only the key or index of each step is checked; the declared kinds are
/// informational. Array elements are materialised as owned scalars, so an
/// array index can only be the last step.
pub fn index<'a>(root: &'a Tag, path: &[PathSegment]) -> Option<Cow<'a, Tag>> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        let last = depth + 1 == path.len();
        current = match (&segment.key, current) {
            (PathKey::Key(key), Tag::Compound(compound)) => compound.get(key)?,
            (PathKey::Index(i), Tag::List(list)) => list.get(*i)?,
            (PathKey::Index(i), Tag::ByteArray(values)) if last => {
                return values.get(*i).map(|v| Cow::Owned(Tag::Byte(*v)));
            }
            (PathKey::Index(i), Tag::IntArray(values)) if last => {
                return values.get(*i).map(|v| Cow::Owned(Tag::Int(*v)));
            }
            (PathKey::Index(i), Tag::LongArray(values)) if last => {
                return values.get(*i).map(|v| Cow::Owned(Tag::Long(*v)));
            }
            _ => return None,
        };
    }
    Some(Cow::Borrowed(current))
}
