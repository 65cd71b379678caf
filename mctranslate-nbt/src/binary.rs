//! Bridge to binary NBT through `fastnbt`.

use fastnbt::{ByteArray, IntArray, LongArray, Value};
use thiserror::Error;

use crate::named::NamedTag;
use crate::tag::{List, Tag, TagKind};

#[derive(Debug, Error)]
pub enum NbtError {
    #[error("binary nbt: {0}")]
    Binary(#[from] fastnbt::error::Error),
    #[error("list mixes {first} and {second} elements")]
    MixedList { first: TagKind, second: TagKind },
    #[error("binary nbt needs a compound root, got {0}")]
    NotCompound(TagKind),
    #[error("truncated root header")]
    Header,
    #[error("root name is not modified UTF-8")]
    Name(#[source] cesu8::Cesu8DecodingError),
}

impl From<Tag> for Value {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Byte(v) => Value::Byte(v),
            Tag::Short(v) => Value::Short(v),
            Tag::Int(v) => Value::Int(v),
            Tag::Long(v) => Value::Long(v),
            Tag::Float(v) => Value::Float(v),
            Tag::Double(v) => Value::Double(v),
            Tag::ByteArray(v) => Value::ByteArray(ByteArray::new(v)),
            Tag::String(v) => Value::String(v),
            Tag::List(list) => Value::List(list.into_vec().into_iter().map(Value::from).collect()),
            Tag::Compound(compound) => Value::Compound(
                compound
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            Tag::IntArray(v) => Value::IntArray(IntArray::new(v)),
            Tag::LongArray(v) => Value::LongArray(LongArray::new(v)),
        }
    }
}

impl TryFrom<Value> for Tag {
    type Error = NbtError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Byte(v) => Tag::Byte(v),
            Value::Short(v) => Tag::Short(v),
            Value::Int(v) => Tag::Int(v),
            Value::Long(v) => Tag::Long(v),
            Value::Float(v) => Tag::Float(v),
            Value::Double(v) => Tag::Double(v),
            Value::String(v) => Tag::String(v),
            Value::ByteArray(v) => Tag::ByteArray(v.into_inner()),
            Value::IntArray(v) => Tag::IntArray(v.into_inner()),
            Value::LongArray(v) => Tag::LongArray(v.into_inner()),
            Value::List(items) => {
                let items = items
                    .into_iter()
                    .map(Tag::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                let mut list = List::new();
                for item in items {
                    if let Some(first) = list.element_kind().filter(|k| *k != item.kind()) {
                        return Err(NbtError::MixedList {
                            first,
                            second: item.kind(),
                        });
                    }
                    list.push(item);
                }
                Tag::List(list)
            }
            Value::Compound(map) => Tag::Compound(
                map.into_iter()
                    .map(|(k, v)| Tag::try_from(v).map(|t| (k, t)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl NamedTag {
    /// Uncompressed binary NBT with this tag's name on the root.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NbtError> {
        if self.tag.kind() != TagKind::Compound {
            return Err(NbtError::NotCompound(self.tag.kind()));
        }
        let value = Value::from(self.tag.clone());
        let opts = fastnbt::SerOpts::new().root_name(&self.name);
        Ok(fastnbt::to_bytes_with_opts(&value, opts)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NbtError> {
        let name = root_name(bytes)?;
        let value: Value = fastnbt::from_bytes(bytes)?;
        Ok(Self::new(name, Tag::try_from(value)?))
    }
}

/// Root name from the header: id byte, big-endian length, modified UTF-8.
fn root_name(bytes: &[u8]) -> Result<String, NbtError> {
    match bytes {
        [id, ..] if *id != TagKind::Compound.id() => Err(NbtError::NotCompound(
            kind_from_id(*id).unwrap_or(TagKind::Compound),
        )),
        [_, hi, lo, rest @ ..] => {
            let len = u16::from_be_bytes([*hi, *lo]) as usize;
            let raw = rest.get(..len).ok_or(NbtError::Header)?;
            cesu8::from_java_cesu8(raw)
                .map(|name| name.into_owned())
                .map_err(NbtError::Name)
        }
        _ => Err(NbtError::Header),
    }
}

fn kind_from_id(id: u8) -> Option<TagKind> {
    [
        TagKind::Byte,
        TagKind::Short,
        TagKind::Int,
        TagKind::Long,
        TagKind::Float,
        TagKind::Double,
        TagKind::ByteArray,
        TagKind::String,
        TagKind::List,
        TagKind::Compound,
        TagKind::IntArray,
        TagKind::LongArray,
    ]
    .into_iter()
    .find(|k| k.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snbt::from_snbt;

    #[test]
    fn test_binary_keeps_name_and_types() {
        let tag = from_snbt("{id:\"minecraft:chest\",Items:[{Slot:0b,Count:1b}],pos:[I;1,2,3],t:5L}")
            .expect("valid snbt");
        let named = NamedTag::new("block", tag);

        let bytes = named.to_bytes().expect("serialize");
        let back = NamedTag::from_bytes(&bytes).expect("deserialize");
        assert_eq!(back, named);
    }

    #[test]
    fn test_non_compound_root_rejected() {
        let named = NamedTag::new("", Tag::Int(1));
        assert!(matches!(named.to_bytes(), Err(NbtError::NotCompound(TagKind::Int))));
        assert!(matches!(NamedTag::from_bytes(&[10]), Err(NbtError::Header)));
    }

    #[test]
    fn test_root_name_is_modified_utf8() {
        // U+1D11E as a surrogate pair, then NUL as the two byte form.
        let bytes = [
            10, 0, 8, 0xED, 0xA0, 0xB4, 0xED, 0xB4, 0x9E, 0xC0, 0x80, 0,
        ];
        let named = NamedTag::from_bytes(&bytes).expect("deserialize");
        assert_eq!(named.name, "\u{1D11E}\u{0}");
        assert_eq!(named.tag, Tag::Compound(Default::default()));

        let invalid = [10, 0, 1, 0xFF, 0];
        assert!(matches!(NamedTag::from_bytes(&invalid), Err(NbtError::Name(_))));
    }
}
