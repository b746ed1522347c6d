//! Face-culled meshing.
//!
//! Every occupied voxel contributes one quad per exposed face. A face is
//! exposed when the cell it looks at is air, or is transparent while the
//! voxel itself is not. Two transparent voxels (water against water) never
//! emit the face between them; an opaque voxel still shows through water.
//!
//! Cells past the chunk edge are resolved through a [`NeighborLookup`]. A
//! neighbour that isn't available counts as air, so faces on the border of
//! loaded terrain are emitted rather than hidden.

use std::collections::HashMap;

use log::trace;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, ChunkKey},
};

use super::{face::Face, mesh::MeshData};

/// Resolves the chunks around the one being meshed.
pub trait NeighborLookup {
    /// The chunk at `offset` (each component in `-1..=1`) from the meshed chunk,
    /// if it is available.
    fn neighbor(&self, offset: [i32; 3]) -> Option<&Chunk>;
}

/// Treats every neighbouring chunk as absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNeighbors;

impl NeighborLookup for NoNeighbors {
    fn neighbor(&self, _offset: [i32; 3]) -> Option<&Chunk> {
        None
    }
}

/// Neighbour chunks owned by a mesh task.
#[derive(Debug, Default)]
pub struct NeighborSet {
    chunks: HashMap<[i32; 3], Chunk>,
}

impl NeighborSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the chunk found at `offset`.
    pub fn insert(&mut self, offset: [i32; 3], chunk: Chunk) {
        self.chunks.insert(offset, chunk);
    }

    /// Number of neighbours held.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// `true` if no neighbours are held.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl NeighborLookup for NeighborSet {
    fn neighbor(&self, offset: [i32; 3]) -> Option<&Chunk> {
        self.chunks.get(&offset)
    }
}

/// Neighbour lookup bound to a map of resident chunks.
pub struct ResidentNeighbors<'a> {
    chunks: &'a HashMap<ChunkKey, Chunk>,
    center: ChunkKey,
}

impl<'a> ResidentNeighbors<'a> {
    /// Looks up neighbours of `center` in `chunks`.
    pub fn new(chunks: &'a HashMap<ChunkKey, Chunk>, center: ChunkKey) -> Self {
        Self { chunks, center }
    }
}

impl NeighborLookup for ResidentNeighbors<'_> {
    fn neighbor(&self, [dx, dy, dz]: [i32; 3]) -> Option<&Chunk> {
        self.chunks
            .get(&ChunkKey::new(self.center.x + dx, self.center.y + dy, self.center.z + dz))
    }
}

/// Reads a cell relative to `chunk`, crossing into neighbours when the
/// coordinate leaves `0..size` on any axis.
fn sample(chunk: &Chunk, neighbors: &impl NeighborLookup, x: i32, y: i32, z: i32) -> BlockType {
    let n = chunk.size() as i32;
    let inside = |c: i32| (0..n).contains(&c);
    if inside(x) && inside(y) && inside(z) {
        return chunk.get_block(x, y, z);
    }

    let offset = [x.div_euclid(n), y.div_euclid(n), z.div_euclid(n)];
    neighbors
        .neighbor(offset)
        .map(|neighbor| neighbor.get_block(x.rem_euclid(n), y.rem_euclid(n), z.rem_euclid(n)))
        .unwrap_or(BlockType::AIR)
}

/// `true` if a face of `current` facing `neighbor` should be drawn.
pub fn face_visible(current: BlockType, neighbor: BlockType) -> bool {
    !neighbor.is_occupied() || (neighbor.is_transparent() && !current.is_transparent())
}

/// Builds the face-culled mesh of `chunk`.
///
/// # Arguments
/// * `chunk` - The chunk to mesh
/// * `neighbors` - Access to the surrounding chunks for faces on the border
///
/// # Returns
/// Chunk-local geometry. Empty if the chunk is empty or fully enclosed.
pub fn mesh_chunk(chunk: &Chunk, neighbors: &impl NeighborLookup) -> MeshData {
    let mut mesh = MeshData::new();
    if chunk.is_empty() {
        return mesh;
    }

    let start = Instant::now();

    for (position, block) in chunk.iter_blocks() {
        for side in BlockSide::all() {
            let step = side.offset();
            let neighbor = sample(
                chunk,
                neighbors,
                position.x + step.x,
                position.y + step.y,
                position.z + step.z,
            );
            if face_visible(block, neighbor) {
                mesh.push_face(&Face::new(position.x, position.y, position.z, block, side));
            }
        }
    }

    trace!(
        "Meshed chunk {:?}: {} faces in {:?}",
        chunk.position,
        mesh.face_count(),
        start.elapsed()
    );

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(size: usize, block: BlockType) -> Chunk {
        let mut chunk = Chunk::empty(ChunkKey::default(), size);
        chunk.set_block(0, 0, 0, block);
        chunk
    }

    #[test]
    fn lone_voxel_emits_six_faces() {
        let mesh = mesh_chunk(&single(4, BlockType::STONE), &NoNeighbors);
        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.normals.len(), 24);
        assert_eq!(mesh.colors.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.indices[30..], [20, 21, 22, 20, 22, 23]);
    }

    #[test]
    fn enclosed_voxel_emits_nothing() {
        let mut chunk = Chunk::empty(ChunkKey::default(), 3);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    chunk.set_block(x, y, z, BlockType::STONE);
                }
            }
        }
        let mesh = mesh_chunk(&chunk, &NoNeighbors);

        // Only the outer shell: 9 quads per side of the cube.
        assert_eq!(mesh.face_count(), 6 * 9);
        assert!(mesh
            .positions
            .iter()
            .all(|p| p.iter().any(|&c| c == 0.0 || c == 3.0)));
    }

    #[test]
    fn adjacent_water_shares_no_face() {
        let mut chunk = Chunk::empty(ChunkKey::default(), 4);
        chunk.set_block(1, 1, 1, BlockType::WATER);
        chunk.set_block(2, 1, 1, BlockType::WATER);

        assert_eq!(mesh_chunk(&chunk, &NoNeighbors).face_count(), 10);
    }

    #[test]
    fn opaque_voxel_shows_through_water() {
        let mut chunk = Chunk::empty(ChunkKey::default(), 4);
        chunk.set_block(1, 1, 1, BlockType::STONE);
        chunk.set_block(2, 1, 1, BlockType::WATER);

        // Stone keeps all six faces; water loses the one against stone.
        assert_eq!(mesh_chunk(&chunk, &NoNeighbors).face_count(), 11);
    }

    #[test]
    fn resident_neighbor_hides_the_border_face() {
        let size = 4;
        let mut chunk = Chunk::empty(ChunkKey::default(), size);
        chunk.set_block(3, 0, 0, BlockType::STONE);

        let mut right = Chunk::empty(ChunkKey::new(1, 0, 0), size);
        right.set_block(0, 0, 0, BlockType::DIRT);

        let mut neighbors = NeighborSet::new();
        neighbors.insert([1, 0, 0], right);

        let mesh = mesh_chunk(&chunk, &neighbors);
        assert_eq!(mesh.face_count(), 5);
        assert!(mesh.normals.iter().all(|n| *n != BlockSide::RIGHT.normal()));
    }

    #[test]
    fn negative_border_resolves_to_the_previous_chunk() {
        let mut resident = HashMap::new();
        let mut below = Chunk::empty(ChunkKey::new(0, -1, 0), 4);
        below.set_block(2, 3, 2, BlockType::STONE);
        resident.insert(below.position, below);

        let chunk = {
            let mut chunk = Chunk::empty(ChunkKey::default(), 4);
            chunk.set_block(2, 0, 2, BlockType::GRASS);
            chunk
        };

        let mesh = mesh_chunk(&chunk, &ResidentNeighbors::new(&resident, ChunkKey::default()));
        assert_eq!(mesh.face_count(), 5);
        assert!(mesh.normals.iter().all(|n| *n != BlockSide::BOTTOM.normal()));
    }

    #[test]
    fn empty_chunk_takes_the_fast_path() {
        let chunk = Chunk::empty(ChunkKey::default(), 8);
        assert!(mesh_chunk(&chunk, &NoNeighbors).is_empty());
    }
}
