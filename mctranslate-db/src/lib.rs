//! The rule database: the mapping language, per-identifier specifications,
//! the per-version tables that hold them, and the sources they load from.

pub mod database;
pub mod rules;
pub mod source;
pub mod specification;
pub mod version;

pub use database::{FormatKey, FormatTables, NotFound, SpecificationDatabase, Table};
pub use rules::{CarryNbt, CodeCall, CodeInput, CodeOutput, MultiblockPart, NewNbt, Rule, WalkNode};
pub use source::{JsonDirectory, RuleSource};
pub use specification::{NbtTemplate, Specification};
pub use version::{BlockFormat, VersionData, VersionMeta, VersionNumber};
