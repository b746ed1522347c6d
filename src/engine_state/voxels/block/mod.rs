//! # Block Module
//!
//! This module provides the block-level data of the voxel engine: the closed
//! set of block types, the six block faces, and the static property record each
//! block type maps to.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// This is the element type of every chunk buffer.
pub type BlockTypeSize = u8;

/// Static data for one block type.
///
/// Colour and texture entries are indexed by [`BlockSide`](block_side::BlockSide)
/// in the order [Front, Back, Bottom, Top, Left, Right].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockProperties {
    /// Blocks movement.
    pub solid: bool,
    /// Lets faces behind it show. Two adjacent transparent blocks hide their shared face.
    pub transparent: bool,
    /// Base RGBA colour per face, before shading.
    pub colors: [[f32; 4]; 6],
    /// Texture atlas tile per face.
    pub texture_tiles: [usize; 6],
}

const fn uniform(solid: bool, transparent: bool, color: [f32; 4], tile: usize) -> BlockProperties {
    BlockProperties {
        solid,
        transparent,
        colors: [color; 6],
        texture_tiles: [tile; 6],
    }
}

const GRASS_SIDE: [f32; 4] = [0.45, 0.55, 0.25, 1.0];
const GRASS_TOP: [f32; 4] = [0.35, 0.70, 0.25, 1.0];
const DIRT: [f32; 4] = [0.50, 0.35, 0.20, 1.0];
const WOOD_SIDE: [f32; 4] = [0.45, 0.30, 0.15, 1.0];
const WOOD_RING: [f32; 4] = [0.65, 0.50, 0.30, 1.0];

/// Property table, indexed by `BlockType as usize`.
pub static BLOCK_PROPERTIES: [BlockProperties; 9] = [
    // AIR
    uniform(false, true, [0.0, 0.0, 0.0, 0.0], 0),
    // STONE
    uniform(true, false, [0.50, 0.50, 0.52, 1.0], 1),
    // DIRT
    uniform(true, false, DIRT, 2),
    // GRASS (top: green, bottom: dirt, sides: mixed)
    BlockProperties {
        solid: true,
        transparent: false,
        colors: [GRASS_SIDE, GRASS_SIDE, DIRT, GRASS_TOP, GRASS_SIDE, GRASS_SIDE],
        texture_tiles: [3, 3, 2, 4, 3, 3],
    },
    // SAND
    uniform(true, false, [0.85, 0.80, 0.55, 1.0], 5),
    // WATER
    uniform(false, true, [0.20, 0.40, 0.80, 0.6], 6),
    // WOOD (rings on top and bottom)
    BlockProperties {
        solid: true,
        transparent: false,
        colors: [WOOD_SIDE, WOOD_SIDE, WOOD_RING, WOOD_RING, WOOD_SIDE, WOOD_SIDE],
        texture_tiles: [7, 7, 8, 8, 7, 7],
    },
    // LEAVES
    uniform(true, true, [0.20, 0.55, 0.20, 0.9], 9),
    // SNOW
    uniform(true, false, [0.95, 0.95, 0.98, 1.0], 10),
];

/// Looks up the unshaded colour of one face of a block type.
pub fn face_color(block_type: BlockType, side: block_side::BlockSide) -> [f32; 4] {
    block_type.properties().colors[side as usize]
}

#[cfg(test)]
mod tests {
    use super::{block_side::BlockSide, *};

    #[test]
    fn table_covers_every_block_type() {
        assert_eq!(BLOCK_PROPERTIES.len(), BlockType::ALL.len());
    }

    #[test]
    fn water_is_transparent_and_passable() {
        assert!(BlockType::WATER.is_transparent());
        assert!(!BlockType::WATER.is_solid());
        assert!(BlockType::LEAVES.is_transparent());
        assert!(BlockType::LEAVES.is_solid());
        assert!(!BlockType::STONE.is_transparent());
    }

    #[test]
    fn grass_top_differs_from_its_sides() {
        assert_ne!(
            face_color(BlockType::GRASS, BlockSide::TOP),
            face_color(BlockType::GRASS, BlockSide::LEFT)
        );
    }
}
