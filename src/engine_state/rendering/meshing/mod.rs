//! Mesh generation and the per-chunk mesh record.
//!
//! # Architecture
//! - `mesh/`: Face-culled extraction of [`MeshData`] from a chunk
//! - [`ChunkMesh`]: What the chunk manager keeps per meshed chunk once the
//!   backend has uploaded it

use cgmath::Vector3;

use crate::engine_state::{
    rendering::MeshHandle,
    spatial::Aabb,
    voxels::chunk::ChunkKey,
};

/// Core mesh generation algorithms and data structures.
pub mod mesh;

pub use mesh::*;

/// An uploaded chunk mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    /// Chunk this mesh was built from
    pub key: ChunkKey,
    /// Backend handle, including buffer ids to release
    pub handle: MeshHandle,
    /// World-space translation of the chunk-local geometry
    pub world_offset: Vector3<f32>,
    /// Number of vertices uploaded
    pub vertex_count: usize,
    /// Number of indices uploaded
    pub index_count: usize,
    /// Culling box, if tight bounds are enabled
    pub bounds: Option<Aabb>,
    /// Chunk version the mesh reflects
    pub source_version: u64,
}
