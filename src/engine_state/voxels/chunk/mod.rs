//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a cubic `N³` grid of block type
//! codes addressed by local coordinates in `0..N`.
//!
//! ## Storage
//!
//! Blocks live in one flat `Box<[u8]>` in x-fastest order
//! (`x + N * y + N² * z`). That is also the wire format used to hand chunks to
//! worker tasks: [`Chunk::into_buffer`] moves the storage out without copying and
//! [`Chunk::from_buffer`] moves it back in after checking its length.
//!
//! ## Change Tracking
//! - `solid_count` counts non-air cells so [`Chunk::is_empty`] is O(1)
//! - `modified` is raised by any content change and lowered by the owner
//! - `version` increases on every content change; a mesh built from version
//!   `v` is stale once the chunk reports a different version

use cgmath::Point3;

use crate::error::EngineError;

use super::block::{block_type::BlockType, BlockTypeSize};

pub use chunk_coord::ChunkKey;
pub use chunk_creation::ChunkCreationIterator;
pub use chunk_iteration::ChunkBlockIterator;

pub mod chunk_coord;
mod chunk_creation;
pub mod chunk_iteration;

/// A cubic grid of voxels at a fixed position in chunk space.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkKey,
    size: usize,
    blocks: Box<[BlockTypeSize]>,
    solid_count: usize,
    modified: bool,
    version: u64,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `size` - Edge length in voxels
    pub fn empty(position: ChunkKey, size: usize) -> Self {
        Self {
            position,
            size,
            blocks: vec![BlockType::AIR.code(); size * size * size].into_boxed_slice(),
            solid_count: 0,
            modified: false,
            version: 0,
        }
    }

    /// Creates a chunk with every cell set to `block`.
    pub fn filled(position: ChunkKey, size: usize, block: BlockType) -> Self {
        let volume = size * size * size;
        Self {
            position,
            size,
            blocks: vec![block.code(); volume].into_boxed_slice(),
            solid_count: if block.is_occupied() { volume } else { 0 },
            modified: false,
            version: 0,
        }
    }

    /// Materializes a chunk from a flat buffer of type codes.
    ///
    /// # Errors
    /// Returns [`EngineError::BufferSize`] unless the buffer holds exactly `size³` entries.
    pub fn from_buffer(
        position: ChunkKey,
        size: usize,
        blocks: Box<[BlockTypeSize]>,
    ) -> Result<Self, EngineError> {
        let expected = size * size * size;
        if blocks.len() != expected {
            return Err(EngineError::BufferSize {
                expected,
                actual: blocks.len(),
            });
        }

        let solid_count = count_occupied(&blocks);
        Ok(Self {
            position,
            size,
            blocks,
            solid_count,
            modified: false,
            version: 0,
        })
    }

    /// Moves the voxel storage out of the chunk.
    pub fn into_buffer(self) -> Box<[BlockTypeSize]> {
        self.blocks
    }

    /// Copies the voxel storage into a new buffer.
    pub fn to_buffer(&self) -> Box<[BlockTypeSize]> {
        self.blocks.clone()
    }

    /// Read-only view of the voxel storage.
    pub fn as_slice(&self) -> &[BlockTypeSize] {
        &self.blocks
    }

    /// Overwrites every voxel from a buffer of the same length.
    ///
    /// Counts as a content change even if the contents happen to be identical.
    pub fn replace_blocks(&mut self, blocks: Box<[BlockTypeSize]>) -> Result<(), EngineError> {
        if blocks.len() != self.blocks.len() {
            return Err(EngineError::BufferSize {
                expected: self.blocks.len(),
                actual: blocks.len(),
            });
        }
        self.solid_count = count_occupied(&blocks);
        self.blocks = blocks;
        self.touch();
        Ok(())
    }

    /// Edge length in voxels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.solid_count
    }

    /// `true` if every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    /// Content version. Starts at 0 and increases on every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// `true` if the content changed since the last [`Chunk::clear_modified`].
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Lowers the modified flag.
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// Flat index of a local coordinate, or `None` if it lies outside the chunk.
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let n = self.size as i32;
        if x < 0 || y < 0 || z < 0 || x >= n || y >= n || z >= n {
            return None;
        }
        let n = self.size;
        Some(x as usize + n * y as usize + n * n * z as usize)
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// Out-of-range coordinates read as `AIR`.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.index(x, y, z)
            .map(|index| BlockType::from_code(self.blocks[index]))
            .unwrap_or(BlockType::AIR)
    }

    /// Sets the block at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// `false` if the coordinates lie outside the chunk (nothing is written),
    /// `true` otherwise. The version only advances if the cell actually changed.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let Some(index) = self.index(x, y, z) else {
            return false;
        };

        let previous = BlockType::from_code(self.blocks[index]);
        if previous != block {
            match (previous.is_occupied(), block.is_occupied()) {
                (false, true) => self.solid_count += 1,
                (true, false) => self.solid_count -= 1,
                _ => {}
            }
            self.blocks[index] = block.code();
            self.touch();
        }
        true
    }

    /// Iterates over every non-air voxel with its local position.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    fn touch(&mut self) {
        self.modified = true;
        self.version += 1;
    }
}

fn count_occupied(blocks: &[BlockTypeSize]) -> usize {
    blocks
        .iter()
        .filter(|&&code| BlockType::from_code(code).is_occupied())
        .count()
}

/// Clears every voxel of `chunk` whose world position lies within `radius` of
/// `center` (squared distance ≤ radius²).
///
/// # Returns
/// The number of voxels that were occupied and are now air.
pub fn carve_sphere(chunk: &mut Chunk, center: Point3<i32>, radius: f32) -> usize {
    let size = chunk.size() as i64;
    let origin = chunk.position.origin(chunk.size());
    let r = radius.ceil() as i64;
    let r2 = f64::from(radius) * f64::from(radius);

    // Intersect the sphere's bounding cube with this chunk in local coordinates.
    let span = |c: i32, o: i32| {
        let c = i64::from(c) - i64::from(o);
        (c.saturating_sub(r).max(0), c.saturating_add(r).min(size - 1))
    };
    let offset = |local: i64, o: i32, c: i32| (local + i64::from(o) - i64::from(c)) as f64;

    let (x0, x1) = span(center.x, origin.x);
    let (y0, y1) = span(center.y, origin.y);
    let (z0, z1) = span(center.z, origin.z);

    let mut cleared = 0;
    for z in z0..=z1 {
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = offset(x, origin.x, center.x);
                let dy = offset(y, origin.y, center.y);
                let dz = offset(z, origin.z, center.z);
                let (x, y, z) = (x as i32, y as i32, z as i32);
                if dx * dx + dy * dy + dz * dz <= r2 && chunk.get_block(x, y, z).is_occupied() {
                    chunk.set_block(x, y, z, BlockType::AIR);
                    cleared += 1;
                }
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_air_and_writes_nothing() {
        let mut chunk = Chunk::filled(ChunkKey::default(), 4, BlockType::STONE);
        assert_eq!(chunk.get_block(-1, 0, 0), BlockType::AIR);
        assert_eq!(chunk.get_block(0, 4, 0), BlockType::AIR);
        assert!(!chunk.set_block(4, 0, 0, BlockType::AIR));
        assert_eq!(chunk.version(), 0);
        assert_eq!(chunk.solid_count(), 64);
    }

    #[test]
    fn writes_track_emptiness_and_version() {
        let mut chunk = Chunk::empty(ChunkKey::default(), 4);
        assert!(chunk.is_empty());

        assert!(chunk.set_block(1, 2, 3, BlockType::DIRT));
        assert!(!chunk.is_empty());
        assert!(chunk.is_modified());
        assert_eq!(chunk.version(), 1);

        // Same value again: in range, but not a change.
        assert!(chunk.set_block(1, 2, 3, BlockType::DIRT));
        assert_eq!(chunk.version(), 1);

        chunk.set_block(1, 2, 3, BlockType::AIR);
        assert!(chunk.is_empty());
        assert_eq!(chunk.version(), 2);
    }

    #[test]
    fn buffer_length_is_validated() {
        let result = Chunk::from_buffer(ChunkKey::default(), 4, vec![0u8; 63].into_boxed_slice());
        assert!(matches!(
            result,
            Err(EngineError::BufferSize {
                expected: 64,
                actual: 63
            })
        ));
    }

    #[test]
    fn buffer_layout_is_x_fastest() {
        let mut chunk = Chunk::empty(ChunkKey::default(), 4);
        chunk.set_block(1, 0, 0, BlockType::SAND);
        chunk.set_block(0, 1, 0, BlockType::SNOW);
        chunk.set_block(0, 0, 1, BlockType::WOOD);

        let buffer = chunk.into_buffer();
        assert_eq!(buffer[1], BlockType::SAND.code());
        assert_eq!(buffer[4], BlockType::SNOW.code());
        assert_eq!(buffer[16], BlockType::WOOD.code());

        let restored = Chunk::from_buffer(ChunkKey::default(), 4, buffer).unwrap();
        assert_eq!(restored.solid_count(), 3);
        assert_eq!(restored.get_block(0, 1, 0), BlockType::SNOW);
    }

    #[test]
    fn carve_clears_only_inside_the_sphere() {
        let mut chunk = Chunk::filled(ChunkKey::default(), 8, BlockType::STONE);
        let cleared = carve_sphere(&mut chunk, Point3::new(4, 4, 4), 1.0);

        // Center plus its six face neighbours.
        assert_eq!(cleared, 7);
        assert_eq!(chunk.get_block(4, 4, 4), BlockType::AIR);
        assert_eq!(chunk.get_block(5, 4, 4), BlockType::AIR);
        assert_eq!(chunk.get_block(5, 5, 4), BlockType::STONE);
        assert_eq!(chunk.solid_count(), 512 - 7);
    }

    #[test]
    fn huge_radius_clears_the_whole_chunk() {
        let mut chunk = Chunk::filled(ChunkKey::new(-2, 0, 3), 4, BlockType::STONE);
        assert_eq!(carve_sphere(&mut chunk, Point3::new(0, 0, 0), 3.0e10), 64);
        assert!(chunk.is_empty());

        let mut far = Chunk::filled(ChunkKey::default(), 4, BlockType::STONE);
        assert_eq!(carve_sphere(&mut far, Point3::new(i32::MAX, i32::MIN, 0), 8.0), 0);
    }

    #[test]
    fn carve_respects_chunk_position() {
        let mut chunk = Chunk::filled(ChunkKey::new(1, 0, 0), 4, BlockType::STONE);
        // Center sits one voxel left of this chunk's origin at world x = 4.
        let cleared = carve_sphere(&mut chunk, Point3::new(3, 1, 1), 1.0);
        assert_eq!(cleared, 1);
        assert_eq!(chunk.get_block(0, 1, 1), BlockType::AIR);
    }
}
