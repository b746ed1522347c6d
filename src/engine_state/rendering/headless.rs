//! A graphics backend without a GPU.
//!
//! `HeadlessRenderer` goes through the same motions as a real backend: it
//! interleaves vertices, allocates a vertex and an index buffer per mesh in the
//! shared [`BufferState`], writes the geometry into them and counts draw calls.
//! The demo binary and the integration tests drive the chunk manager with it.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};
use log::{debug, info, warn};

use crate::{
    core::StResource,
    engine_state::buffer_state::{BufferState, BufferWriteCommand},
    error::EngineError,
};

use super::{ChunkMesh, GraphicsBackend, MeshData, MeshHandle, Vertex};

/// Label of per-mesh vertex buffers in the [`BufferState`].
pub const VERTEX_BUFFER_LABEL: &str = "chunk_vertex_buffer";
/// Label of per-mesh index buffers in the [`BufferState`].
pub const INDEX_BUFFER_LABEL: &str = "chunk_index_buffer";

#[derive(Debug)]
struct UploadedMesh {
    world_offset: Vector3<f32>,
    vertex_count: usize,
}

/// Counters kept by the headless backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Meshes currently uploaded
    pub live_meshes: usize,
    /// Meshes ever created
    pub meshes_created: u64,
    /// Meshes ever deleted
    pub meshes_deleted: u64,
    /// Calls to `render_batch`
    pub batches: u64,
    /// Meshes drawn by the last batch
    pub last_batch_size: usize,
}

/// Records uploads and draws into a shared [`BufferState`].
pub struct HeadlessRenderer {
    buffer_state: StResource<BufferState>,
    stats: StResource<HeadlessStats>,
    meshes: HashMap<u64, UploadedMesh>,
    next_mesh_id: u64,
    initialized: bool,
    unavailable: Option<String>,
}

impl HeadlessRenderer {
    /// Creates a backend allocating from `buffer_state`.
    pub fn new(buffer_state: StResource<BufferState>) -> Self {
        Self {
            buffer_state,
            stats: StResource::new(HeadlessStats::default()),
            meshes: HashMap::new(),
            next_mesh_id: 0,
            initialized: false,
            unavailable: None,
        }
    }

    /// Creates a backend whose `initialize` always fails with `reason`.
    pub fn unavailable(buffer_state: StResource<BufferState>, reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::new(buffer_state)
        }
    }

    /// Handle to the backend's counters, readable after the backend has been
    /// moved into a chunk manager.
    pub fn stats(&self) -> StResource<HeadlessStats> {
        self.stats.clone()
    }

    fn upload<T: bytemuck::NoUninit + Send + Sync>(
        &self,
        label: &'static str,
        data: Vec<T>,
    ) -> crate::engine_state::buffer_state::BufferId {
        let size = std::mem::size_of_val(data.as_slice()) as u64;
        let mut buffer_state = self.buffer_state.get_mut();
        let buffer_id = buffer_state.create_buffer(label, size);
        buffer_state.write(BufferWriteCommand {
            name: format!("{label} upload"),
            buffer_id,
            offset: 0,
            data: Box::new(data),
        });
        buffer_id
    }
}

impl GraphicsBackend for HeadlessRenderer {
    fn initialize(&mut self) -> Result<(), EngineError> {
        if let Some(reason) = &self.unavailable {
            return Err(EngineError::BackendUnavailable(reason.clone()));
        }
        self.initialized = true;
        info!("Headless graphics backend initialized");
        Ok(())
    }

    fn create_mesh(&mut self, data: &MeshData, world_offset: Vector3<f32>) -> MeshHandle {
        if !self.initialized {
            warn!("create_mesh called before initialize");
        }

        let id = self.next_mesh_id;
        self.next_mesh_id += 1;

        let vertex_buffer = self.upload(VERTEX_BUFFER_LABEL, data.to_vertices());
        let index_buffer = self.upload(INDEX_BUFFER_LABEL, data.indices.clone());

        debug!(
            "Uploaded mesh {} ({} vertices, {} bytes)",
            id,
            data.vertex_count(),
            data.vertex_count() as u64 * Vertex::SIZE
        );

        self.meshes.insert(
            id,
            UploadedMesh {
                world_offset,
                vertex_count: data.vertex_count(),
            },
        );

        let mut stats = self.stats.get_mut();
        stats.live_meshes = self.meshes.len();
        stats.meshes_created += 1;

        MeshHandle {
            id,
            buffers: vec![vertex_buffer, index_buffer],
        }
    }

    fn delete_mesh(&mut self, handle: &MeshHandle) {
        if self.meshes.remove(&handle.id).is_none() {
            warn!("Deleted unknown mesh {}", handle.id);
            return;
        }
        let mut stats = self.stats.get_mut();
        stats.live_meshes = self.meshes.len();
        stats.meshes_deleted += 1;
    }

    fn render_batch(
        &mut self,
        meshes: &[&ChunkMesh],
        _projection: &Matrix4<f32>,
        _view: &Matrix4<f32>,
    ) -> usize {
        let drawn = meshes
            .iter()
            .filter(|mesh| {
                self.meshes.get(&mesh.handle.id).is_some_and(|uploaded| {
                    uploaded.vertex_count > 0 && uploaded.world_offset == mesh.world_offset
                })
            })
            .count();

        let mut stats = self.stats.get_mut();
        stats.batches += 1;
        stats.last_batch_size = drawn;
        drawn
    }
}
