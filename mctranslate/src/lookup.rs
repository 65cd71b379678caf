//! Reaching back into the world during a translation.

use thiserror::Error;

use crate::objects::{Block, BlockCoordinates, BlockEntity};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("chunk containing {0:?} is not loaded")]
    ChunkNotLoaded(BlockCoordinates),
    #[error("block lookup at {location:?} failed: {reason}")]
    Failed {
        location: BlockCoordinates,
        reason: String,
    },
}

/// Host supplied access to blocks near the one being translated.
///
/// Coordinates are relative to that block. `(None, None)` means there is
/// nothing there and is not an error.
pub trait BlockLookup {
    fn block_at(
        &self,
        relative: BlockCoordinates,
    ) -> Result<(Option<Block>, Option<BlockEntity>), LookupError>;
}

impl<F> BlockLookup for F
where
    F: Fn(BlockCoordinates) -> Result<(Option<Block>, Option<BlockEntity>), LookupError>,
{
    fn block_at(
        &self,
        relative: BlockCoordinates,
    ) -> Result<(Option<Block>, Option<BlockEntity>), LookupError> {
        self(relative)
    }
}

pub(crate) fn offset(base: BlockCoordinates, [dx, dy, dz]: [i32; 3]) -> BlockCoordinates {
    (base.0 + dx, base.1 + dy, base.2 + dz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_lookup() {
        let lookup = |relative: BlockCoordinates| -> Result<(Option<Block>, Option<BlockEntity>), LookupError> {
            match relative {
                (0, 1, 0) => Ok((
                    Some(Block::parse_blockstate("minecraft:stone").expect("valid blockstate")),
                    None,
                )),
                (0, 0, 0) => Ok((None, None)),
                other => Err(LookupError::ChunkNotLoaded(other)),
            }
        };
        let (block, entity) = lookup.block_at((0, 1, 0)).expect("loaded");
        assert_eq!(block.map(|b| b.namespaced_name()), Some("minecraft:stone".to_string()));
        assert!(entity.is_none());
        assert_eq!(lookup.block_at((0, 0, 0)).expect("loaded"), (None, None));
        assert!(lookup.block_at((99, 0, 0)).is_err());
        assert_eq!(offset((1, 2, 3), [0, -1, 4]), (1, 1, 7));
    }
}
