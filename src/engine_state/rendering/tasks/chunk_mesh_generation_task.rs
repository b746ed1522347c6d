//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which is responsible for
//! extracting vertex and index data for a chunk off the driving thread. The
//! task owns copies of the target chunk and of every resident neighbour, so
//! the resident map can keep changing while the worker meshes.

use log::warn;

use crate::engine_state::{
    rendering::meshing::{mesh_chunk, MeshData, NeighborSet},
    task_management::task::{Task, TaskResult},
    voxels::{
        block::BlockTypeSize,
        chunk::{Chunk, ChunkKey},
        world::ChunkManager,
    },
};

/// A task that generates mesh data for a chunk in a background thread.
pub struct ChunkMeshGenerationTask {
    key: ChunkKey,
    size: usize,
    ticket: u64,
    /// Chunk version the buffers were copied from
    version: u64,
    blocks: Box<[BlockTypeSize]>,
    /// Copies of resident neighbours, keyed by offset from `key`
    neighbors: Vec<([i32; 3], Box<[BlockTypeSize]>)>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `key` - The chunk to mesh
    /// * `size` - Edge length of the chunk and its neighbours
    /// * `ticket` - Ticket of the pending operation
    /// * `version` - Version of the chunk the buffers were copied from
    /// * `blocks` - The chunk's voxel buffer
    /// * `neighbors` - Voxel buffers of the resident neighbours
    pub fn new(
        key: ChunkKey,
        size: usize,
        ticket: u64,
        version: u64,
        blocks: Box<[BlockTypeSize]>,
        neighbors: Vec<([i32; 3], Box<[BlockTypeSize]>)>,
    ) -> Self {
        ChunkMeshGenerationTask {
            key,
            size,
            ticket,
            version,
            blocks,
            neighbors,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn name(&self) -> &'static str {
        "chunk_mesh_generation"
    }

    fn process(self: Box<Self>) -> Box<dyn TaskResult> {
        let ChunkMeshGenerationTask {
            key,
            size,
            ticket,
            version,
            blocks,
            neighbors,
        } = *self;

        let mesh = match Chunk::from_buffer(key, size, blocks) {
            Ok(chunk) => {
                let mut set = NeighborSet::new();
                for (offset, buffer) in neighbors {
                    let neighbor_key = key.offset(offset.into());
                    match Chunk::from_buffer(neighbor_key, size, buffer) {
                        Ok(neighbor) => set.insert(offset, neighbor),
                        Err(err) => warn!("Meshing {:?} without neighbour {:?}: {}", key, neighbor_key, err),
                    }
                }
                Some(mesh_chunk(&chunk, &set))
            }
            Err(err) => {
                warn!("Cannot mesh {:?}: {}", key, err);
                None
            }
        };

        Box::new(ChunkMeshGenerationTaskResult {
            key,
            ticket,
            version,
            mesh,
        })
    }
}

/// The result of a chunk mesh generation task.
///
/// `mesh` is `None` when the task could not rebuild the chunk from its buffer;
/// the chunk then stays dirty and is retried.
pub struct ChunkMeshGenerationTaskResult {
    key: ChunkKey,
    ticket: u64,
    version: u64,
    mesh: Option<MeshData>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    fn handle_result(self: Box<Self>, manager: &mut ChunkManager) {
        manager.complete_mesh(self.key, self.ticket, self.version, self.mesh);
    }
}
