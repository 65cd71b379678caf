//! The tagged value model.
//!
//! Every value the translator reads or writes is a [`Tag`]: one of six scalar
//! kinds, a string, one of three fixed-type arrays, a homogeneous [`List`] or
//! a [`Compound`]. Floats compare and hash by bit pattern so that tags can be
//! used as map keys.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Keyed children of a compound tag. Keys are unique and iterate sorted.
pub type Compound = BTreeMap<String, Tag>;

/// The twelve tag datatypes, named the way the rule files name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl TagKind {
    /// Binary NBT type id.
    pub const fn id(self) -> u8 {
        match self {
            TagKind::Byte => 1,
            TagKind::Short => 2,
            TagKind::Int => 3,
            TagKind::Long => 4,
            TagKind::Float => 5,
            TagKind::Double => 6,
            TagKind::ByteArray => 7,
            TagKind::String => 8,
            TagKind::List => 9,
            TagKind::Compound => 10,
            TagKind::IntArray => 11,
            TagKind::LongArray => 12,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TagKind::Byte => "byte",
            TagKind::Short => "short",
            TagKind::Int => "int",
            TagKind::Long => "long",
            TagKind::Float => "float",
            TagKind::Double => "double",
            TagKind::ByteArray => "byte_array",
            TagKind::String => "string",
            TagKind::List => "list",
            TagKind::Compound => "compound",
            TagKind::IntArray => "int_array",
            TagKind::LongArray => "long_array",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            TagKind::Byte
                | TagKind::Short
                | TagKind::Int
                | TagKind::Long
                | TagKind::Float
                | TagKind::Double
        )
    }

    /// Element kind of the fixed-type arrays.
    pub const fn array_element(self) -> Option<TagKind> {
        match self {
            TagKind::ByteArray => Some(TagKind::Byte),
            TagKind::IntArray => Some(TagKind::Int),
            TagKind::LongArray => Some(TagKind::Long),
            _ => None,
        }
    }

    /// A freshly constructed empty value of this kind.
    pub fn empty(self) -> Tag {
        match self {
            TagKind::Byte => Tag::Byte(0),
            TagKind::Short => Tag::Short(0),
            TagKind::Int => Tag::Int(0),
            TagKind::Long => Tag::Long(0),
            TagKind::Float => Tag::Float(0.0),
            TagKind::Double => Tag::Double(0.0),
            TagKind::ByteArray => Tag::ByteArray(Vec::new()),
            TagKind::String => Tag::String(String::new()),
            TagKind::List => Tag::List(List::new()),
            TagKind::Compound => Tag::Compound(Compound::new()),
            TagKind::IntArray => Tag::IntArray(Vec::new()),
            TagKind::LongArray => Tag::LongArray(Vec::new()),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single nested-tag value.
#[derive(Debug, Clone)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Short(_) => TagKind::Short,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::Double(_) => TagKind::Double,
            Tag::ByteArray(_) => TagKind::ByteArray,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
            Tag::IntArray(_) => TagKind::IntArray,
            Tag::LongArray(_) => TagKind::LongArray,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Tag::String(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Tag::List(l) => Some(l),
            _ => None,
        }
    }

    /// Integer value of the four integer kinds.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(v.into()),
            Tag::Short(v) => Some(v.into()),
            Tag::Int(v) => Some(v.into()),
            Tag::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Value of any numeric kind as a double.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Tag::Float(v) => Some(v.into()),
            Tag::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Convert a numeric tag to another numeric kind, truncating like a C cast.
    /// Any tag casts to its own kind.
    pub fn cast(&self, kind: TagKind) -> Option<Tag> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        if !self.kind().is_numeric() || !kind.is_numeric() {
            return None;
        }
        let float = self.as_f64()?;
        let int = match *self {
            Tag::Float(v) => v as i64,
            Tag::Double(v) => v as i64,
            _ => self.as_i64()?,
        };
        Some(match kind {
            TagKind::Byte => Tag::Byte(int as i8),
            TagKind::Short => Tag::Short(int as i16),
            TagKind::Int => Tag::Int(int as i32),
            TagKind::Long => Tag::Long(int),
            TagKind::Float => Tag::Float(float as f32),
            TagKind::Double => Tag::Double(float),
            _ => return None,
        })
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Tag::Byte(a), Tag::Byte(b)) => a == b,
            (Tag::Short(a), Tag::Short(b)) => a == b,
            (Tag::Int(a), Tag::Int(b)) => a == b,
            (Tag::Long(a), Tag::Long(b)) => a == b,
            (Tag::Float(a), Tag::Float(b)) => a.to_bits() == b.to_bits(),
            (Tag::Double(a), Tag::Double(b)) => a.to_bits() == b.to_bits(),
            (Tag::ByteArray(a), Tag::ByteArray(b)) => a == b,
            (Tag::String(a), Tag::String(b)) => a == b,
            (Tag::List(a), Tag::List(b)) => a == b,
            (Tag::Compound(a), Tag::Compound(b)) => a == b,
            (Tag::IntArray(a), Tag::IntArray(b)) => a == b,
            (Tag::LongArray(a), Tag::LongArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Tag::Byte(v) => v.hash(state),
            Tag::Short(v) => v.hash(state),
            Tag::Int(v) => v.hash(state),
            Tag::Long(v) => v.hash(state),
            Tag::Float(v) => v.to_bits().hash(state),
            Tag::Double(v) => v.to_bits().hash(state),
            Tag::ByteArray(v) => v.hash(state),
            Tag::String(v) => v.hash(state),
            Tag::List(v) => v.hash(state),
            Tag::Compound(v) => v.hash(state),
            Tag::IntArray(v) => v.hash(state),
            Tag::LongArray(v) => v.hash(state),
        }
    }
}

impl From<i8> for Tag {
    fn from(v: i8) -> Self {
        Tag::Byte(v)
    }
}

impl From<i16> for Tag {
    fn from(v: i16) -> Self {
        Tag::Short(v)
    }
}

impl From<i32> for Tag {
    fn from(v: i32) -> Self {
        Tag::Int(v)
    }
}

impl From<i64> for Tag {
    fn from(v: i64) -> Self {
        Tag::Long(v)
    }
}

impl From<&str> for Tag {
    fn from(v: &str) -> Self {
        Tag::String(v.to_string())
    }
}

impl From<String> for Tag {
    fn from(v: String) -> Self {
        Tag::String(v)
    }
}

impl From<Compound> for Tag {
    fn from(v: Compound) -> Self {
        Tag::Compound(v)
    }
}

impl From<List> for Tag {
    fn from(v: List) -> Self {
        Tag::List(v)
    }
}

/// An ordered list whose elements all share one kind.
///
/// An empty list has no element kind until the first push. Mixing kinds is a
/// programming error and panics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct List {
    kind: Option<TagKind>,
    items: Vec<Tag>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list already typed as `kind`.
    pub fn of(kind: TagKind) -> Self {
        Self {
            kind: Some(kind),
            items: Vec::new(),
        }
    }

    /// Build a list from `items`, or `None` if they do not share one kind.
    pub fn from_homogeneous(items: Vec<Tag>) -> Option<Self> {
        let kind = items.first().map(Tag::kind);
        if items.iter().any(|item| Some(item.kind()) != kind) {
            return None;
        }
        Some(Self { kind, items })
    }

    pub fn element_kind(&self) -> Option<TagKind> {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tag> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    pub fn push(&mut self, tag: Tag) {
        let kind = tag.kind();
        assert!(
            self.items.is_empty() || self.kind == Some(kind),
            "cannot push a {kind} tag onto a list of {:?}",
            self.kind
        );
        self.kind = Some(kind);
        self.items.push(tag);
    }

    /// Replace the element at `index`. The new tag must match the list kind.
    pub fn set(&mut self, index: usize, tag: Tag) {
        assert!(
            self.kind == Some(tag.kind()),
            "cannot store a {} tag in a list of {:?}",
            tag.kind(),
            self.kind
        );
        self.items[index] = tag;
    }

    /// Retype the list. Existing elements of another kind are replaced by
    /// empty values of `kind`, so their data is lost.
    pub fn coerce(&mut self, kind: TagKind) {
        if self.kind != Some(kind) {
            for item in &mut self.items {
                *item = kind.empty();
            }
            self.kind = Some(kind);
        }
    }

    /// Grow the list to `len` elements with empty values of its kind.
    pub fn pad_to(&mut self, len: usize, kind: TagKind) {
        self.coerce(kind);
        while self.items.len() < len {
            self.items.push(kind.empty());
        }
    }

    pub fn into_vec(self) -> Vec<Tag> {
        self.items
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Tag::Float(1.5), Tag::Float(1.5));
        assert_ne!(Tag::Double(0.0), Tag::Double(-0.0));
        assert_ne!(Tag::Int(1), Tag::Long(1));

        let mut set = HashSet::new();
        set.insert(Tag::Double(f64::NAN));
        assert!(set.contains(&Tag::Double(f64::NAN)));
    }

    #[test]
    fn test_empty_list_takes_first_kind() {
        let mut list = List::new();
        assert_eq!(list.element_kind(), None);
        list.push(Tag::Int(4));
        assert_eq!(list.element_kind(), Some(TagKind::Int));
        assert_eq!(list.len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_mixed_list_panics() {
        let mut list = List::new();
        list.push(Tag::Int(4));
        list.push(Tag::string("four"));
    }

    #[test]
    fn test_coerce_truncates_data() {
        let mut list = List::from_homogeneous(vec![Tag::Int(1), Tag::Int(2)]).expect("homogeneous");
        list.coerce(TagKind::String);
        assert_eq!(list.element_kind(), Some(TagKind::String));
        assert_eq!(list.get(0), Some(&Tag::string("")));
        assert_eq!(list.get(1), Some(&Tag::string("")));

        list.pad_to(4, TagKind::String);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_from_homogeneous_rejects_mixed() {
        assert!(List::from_homogeneous(vec![Tag::Int(1), Tag::Byte(1)]).is_none());
        assert!(List::from_homogeneous(Vec::new()).is_some());
    }

    #[test]
    fn test_cast_numeric() {
        assert_eq!(Tag::Int(300).cast(TagKind::Byte), Some(Tag::Byte(44)));
        assert_eq!(Tag::Float(2.75).cast(TagKind::Int), Some(Tag::Int(2)));
        assert_eq!(Tag::Byte(3).cast(TagKind::Double), Some(Tag::Double(3.0)));
        assert_eq!(Tag::string("x").cast(TagKind::String), Some(Tag::string("x")));
        assert_eq!(Tag::string("1").cast(TagKind::Int), None);
    }

    #[test]
    fn test_kind_names_match_rule_files() {
        let kind: TagKind = serde_json::from_str("\"byte_array\"").expect("valid kind");
        assert_eq!(kind, TagKind::ByteArray);
        assert_eq!(TagKind::LongArray.to_string(), "long_array");
        assert_eq!(TagKind::Compound.empty(), Tag::Compound(Compound::new()));
    }
}
