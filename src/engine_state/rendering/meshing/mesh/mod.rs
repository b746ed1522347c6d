//! Mesh generation for voxel rendering.
//!
//! # Architecture
//! - [`MeshData`]: Chunk-local positions, normals, colours and indices
//! - [`Face`]: One quad of a voxel, with its fixed counter-clockwise winding
//! - [`mesh_chunk`]: Face-culled extraction across chunk borders
//!
//! # Usage
//! ```
//! use voxel_stream::engine_state::{
//!     rendering::meshing::{mesh_chunk, NoNeighbors},
//!     voxels::{block::block_type::BlockType, chunk::{Chunk, ChunkKey}},
//! };
//!
//! let mut chunk = Chunk::empty(ChunkKey::new(0, 0, 0), 4);
//! chunk.set_block(0, 0, 0, BlockType::STONE);
//!
//! let mesh = mesh_chunk(&chunk, &NoNeighbors);
//! assert_eq!(mesh.vertex_count(), 24);
//! assert_eq!(mesh.index_count(), 36);
//! ```

mod culled;
mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use culled::{face_visible, mesh_chunk, NeighborLookup, NeighborSet, NoNeighbors, ResidentNeighbors};
pub use face::{Face, FACE_INDICES};
pub use mesh::MeshData;
