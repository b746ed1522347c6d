//! # Block Type Module
//!
//! This module defines the closed set of voxel kinds in the world and their
//! conversion to and from the compact on-disk / in-buffer type code.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::{BlockProperties, BlockTypeSize, BLOCK_PROPERTIES};

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the type code stored in chunk buffers. `AIR` is code 0
/// so a zeroed buffer is an empty chunk.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never meshed, never hit by a ray.
    AIR = 0,

    /// Bulk underground rock.
    STONE = 1,

    /// The few layers under the surface.
    DIRT = 2,

    /// Surface layer above sea level.
    GRASS = 3,

    /// Surface layer along shores.
    SAND = 4,

    /// Fills terrain below sea level. Transparent and not solid.
    WATER = 5,

    /// Tree trunks.
    WOOD = 6,

    /// Tree canopy. Transparent but solid.
    LEAVES = 7,

    /// Surface layer on peaks.
    SNOW = 8,
}

impl BlockType {
    /// Every block type, in type-code order.
    pub const ALL: [BlockType; 9] = [
        BlockType::AIR,
        BlockType::STONE,
        BlockType::DIRT,
        BlockType::GRASS,
        BlockType::SAND,
        BlockType::WATER,
        BlockType::WOOD,
        BlockType::LEAVES,
        BlockType::SNOW,
    ];

    /// Converts a stored type code to a `BlockType`.
    ///
    /// Unknown codes decode as `AIR`, matching how out-of-range reads behave.
    ///
    /// # Arguments
    /// * `code` - The block type as a `BlockTypeSize`
    pub fn from_code(code: BlockTypeSize) -> Self {
        BlockType::from_u8(code).unwrap_or(BlockType::AIR)
    }

    /// The compact code stored in chunk buffers.
    pub fn code(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Static properties of this block type.
    pub fn properties(self) -> &'static BlockProperties {
        &BLOCK_PROPERTIES[self as usize]
    }

    /// `true` for anything but `AIR`.
    pub fn is_occupied(self) -> bool {
        self != BlockType::AIR
    }

    /// `true` if light and faces show through this block.
    pub fn is_transparent(self) -> bool {
        self.properties().transparent
    }

    /// `true` if this block stops movement.
    pub fn is_solid(self) -> bool {
        self.properties().solid
    }

    /// Generates a random occupied block type.
    ///
    /// Used by the demo binary to vary what it places.
    pub fn random_occupied() -> Self {
        Self::from_code(fastrand::u8(1..Self::ALL.len() as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for block in BlockType::ALL {
            assert_eq!(BlockType::from_code(block.code()), block);
        }
    }

    #[test]
    fn unknown_codes_decode_as_air() {
        assert_eq!(BlockType::from_code(200), BlockType::AIR);
    }

    #[test]
    fn random_occupied_is_never_air() {
        for _ in 0..64 {
            assert!(BlockType::random_occupied().is_occupied());
        }
    }
}
