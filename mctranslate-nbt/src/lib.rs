//! Tagged values for the translator: the [`Tag`] tree, its stringified form,
//! typed paths into it, and conversion to and from binary NBT.

pub mod binary;
pub mod named;
pub mod path;
pub mod snbt;
pub mod tag;

pub use binary::NbtError;
pub use named::NamedTag;
pub use path::{NbtPath, PathKey, PathSegment};
pub use snbt::{SnbtError, from_snbt};
pub use tag::{Compound, List, Tag, TagKind};
