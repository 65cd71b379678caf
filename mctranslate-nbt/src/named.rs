use std::borrow::Cow;

use crate::path::{self, PathSegment};
use crate::tag::{Compound, Tag, TagKind};

/// A root tag together with its name, as stored on a block entity or entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedTag {
    pub name: String,
    pub tag: Tag,
}

impl Default for NamedTag {
    fn default() -> Self {
        Self::new("", Tag::Compound(Compound::new()))
    }
}

impl NamedTag {
    pub fn new(name: impl Into<String>, tag: Tag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    pub fn compound(&self) -> Option<&Compound> {
        self.tag.as_compound()
    }

    /// Look up the value at `path`, provided the root carries the expected
    /// name and kind.
    pub fn lookup(
        &self,
        outer_name: &str,
        outer_kind: TagKind,
        path: &[PathSegment],
    ) -> Option<Cow<'_, Tag>> {
        if self.name != outer_name || self.tag.kind() != outer_kind {
            return None;
        }
        path::index(&self.tag, path)
    }
}
