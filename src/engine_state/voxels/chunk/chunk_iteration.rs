//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air voxels of a chunk.
//!
//! The iterator walks the flat buffer in storage order and tracks the local
//! coordinate alongside the flat index, so no division is needed per cell.
//! An empty chunk is skipped entirely.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::Chunk;

/// An iterator over all non-air blocks in a chunk.
///
/// Yields `(local_position, block_type)` in x-fastest order.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next flat index to inspect
    offset: usize,
    /// Local coordinate of `offset`
    local: [usize; 3],
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        let offset = if chunk_ref.is_empty() {
            chunk_ref.as_slice().len()
        } else {
            0
        };

        ChunkBlockIterator {
            chunk_ref,
            offset,
            local: [0; 3],
        }
    }

    fn advance(&mut self) {
        let size = self.chunk_ref.size();
        self.offset += 1;
        self.local[0] += 1;
        if self.local[0] == size {
            self.local[0] = 0;
            self.local[1] += 1;
            if self.local[1] == size {
                self.local[1] = 0;
                self.local[2] += 1;
            }
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.as_slice();
        while self.offset < blocks.len() {
            let block = BlockType::from_code(blocks[self.offset]);
            let position = Point3::new(self.local[0] as i32, self.local[1] as i32, self.local[2] as i32);
            self.advance();
            if block.is_occupied() {
                return Some((position, block));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkKey;

    #[test]
    fn yields_only_occupied_cells_with_positions() {
        let mut chunk = Chunk::empty(ChunkKey::default(), 3);
        chunk.set_block(2, 0, 0, BlockType::DIRT);
        chunk.set_block(0, 2, 1, BlockType::STONE);

        let blocks: Vec<_> = chunk.iter_blocks().collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(2, 0, 0), BlockType::DIRT),
                (Point3::new(0, 2, 1), BlockType::STONE),
            ]
        );
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::empty(ChunkKey::default(), 8);
        assert_eq!(chunk.iter_blocks().count(), 0);
    }
}
