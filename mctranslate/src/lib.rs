//! Block and entity translation between game versions.
//!
//! Every version is described by rule tables (see `mctranslate_db`) that map
//! its blocks and entities to and from one shared "universal" format. A
//! [`TranslationManager`] loads those tables, resolves which loaded
//! [`Version`] a world needs, and each version's [`BlockTranslator`] and
//! [`EntityTranslator`] run the rules.
//!
//! ```no_run
//! use mctranslate::{BlockContext, Block, Config, TranslationManager};
//!
//! # fn main() -> anyhow::Result<()> {
//! let manager = TranslationManager::from_config(&Config::from_env())?;
//! let java = manager.get_version("java", (1, 16, 5))?;
//! let chest = Block::parse_blockstate("minecraft:chest[facing=north,type=single]")?;
//! let universal = java.block().to_universal(&chest, BlockContext::default());
//! println!("{}", universal.output);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod functions;
pub mod lookup;
pub mod manager;
pub mod objects;
pub mod raw_text;
pub mod registry;
pub mod translate;
pub mod translators;
pub mod version;
mod walk;

pub use config::Config;
pub use functions::{CodeError, CodeFunction, CodeValue, FunctionRegistry};
pub use lookup::{BlockLookup, LookupError};
pub use manager::{ManagerError, ResolveError, TranslationManager, VersionSelector};
pub use objects::{Block, BlockCoordinates, BlockEntity, BlockstateError, Entity, Properties, Record};
pub use registry::NumericalRegistry;
pub use translate::{TranslateError, TranslateRequest, Translation, translate};
pub use translators::{BlockContext, BlockTranslator, Direction, EntityTranslator};
pub use version::Version;
