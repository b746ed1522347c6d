//! # Chunk Creation Module
//!
//! This module provides a builder that fills a chunk one cell at a time in
//! storage order. Generators that visit every cell anyway use it to avoid the
//! bounds check and version bump of [`Chunk::set_block`].

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::{Chunk, ChunkKey};

/// Fills a chunk in x-fastest order and hands it back once every cell is set.
///
/// Cells that are never pushed stay `AIR`.
pub struct ChunkCreationIterator {
    /// The chunk position of the chunk being created
    position: ChunkKey,
    /// Edge length in voxels
    size: usize,
    /// Type codes pushed so far
    blocks: Vec<BlockTypeSize>,
}

impl ChunkCreationIterator {
    /// Starts building a chunk at `position`.
    pub fn new(position: ChunkKey, size: usize) -> Self {
        ChunkCreationIterator {
            position,
            size,
            blocks: Vec::with_capacity(size * size * size),
        }
    }

    /// Appends the next cell. Pushes beyond `size³` cells are ignored.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        if self.blocks.len() < self.size * self.size * self.size {
            self.blocks.push(block_type.code());
        }
    }

    /// Finishes the chunk, padding any cells never pushed with `AIR`.
    pub fn return_chunk(mut self) -> Chunk {
        let volume = self.size * self.size * self.size;
        self.blocks.resize(volume, BlockType::AIR.code());
        let size = self.size;
        let position = self.position;
        Chunk::from_buffer(position, size, self.blocks.into_boxed_slice())
            .unwrap_or_else(|_| Chunk::empty(position, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_fill_in_storage_order() {
        let mut builder = ChunkCreationIterator::new(ChunkKey::new(0, 0, 0), 2);
        builder.push_block_type(BlockType::STONE);
        builder.push_block_type(BlockType::AIR);
        builder.push_block_type(BlockType::DIRT);

        let chunk = builder.return_chunk();
        assert_eq!(chunk.get_block(0, 0, 0), BlockType::STONE);
        assert_eq!(chunk.get_block(0, 1, 0), BlockType::DIRT);
        assert_eq!(chunk.get_block(1, 1, 1), BlockType::AIR);
        assert_eq!(chunk.solid_count(), 2);
    }
}
