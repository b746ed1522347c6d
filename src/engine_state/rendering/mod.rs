//! Rendering system for the voxel engine.
//!
//! The streaming core does not draw anything itself. It turns chunks into
//! [`MeshData`](meshing::MeshData), hands that to a [`GraphicsBackend`] to
//! upload, and later passes the frustum-culled set of [`ChunkMesh`]es back to
//! the backend to draw. Buffers a backend attaches to a mesh are returned
//! through a [`BufferAllocator`] when the mesh is dropped.
//!
//! - `meshing`: Face-culled mesh extraction and the per-chunk mesh record
//! - `tasks`: Mesh extraction as a worker task
//! - `headless`: A backend that records uploads and draw calls without a GPU

use cgmath::{Matrix4, Vector3};

use crate::error::EngineError;

use super::buffer_state::BufferId;

pub mod headless;
pub mod meshing;
pub mod tasks;
mod vertex;

// Re-export commonly used types
pub use headless::HeadlessRenderer;
pub use meshing::{ChunkMesh, MeshData};
pub use vertex::Vertex;

/// Backend-side identity of an uploaded mesh.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    /// Backend mesh id
    pub id: u64,
    /// Buffers attached to the mesh, released through a [`BufferAllocator`]
    pub buffers: Vec<BufferId>,
}

/// Whatever actually puts chunk meshes on screen.
pub trait GraphicsBackend {
    /// Acquires the graphics context. Called once, before any other method.
    ///
    /// # Errors
    /// [`EngineError::BackendUnavailable`] if no context can be created. The
    /// chunk manager surfaces this to the host and does not retry.
    fn initialize(&mut self) -> Result<(), EngineError>;

    /// Uploads chunk-local geometry that will be drawn at `world_offset`.
    fn create_mesh(&mut self, data: &MeshData, world_offset: Vector3<f32>) -> MeshHandle;

    /// Frees a mesh's backend-side state. Its buffers are released separately.
    fn delete_mesh(&mut self, handle: &MeshHandle);

    /// Draws a batch of meshes.
    ///
    /// # Returns
    /// The number of meshes drawn.
    fn render_batch(
        &mut self,
        meshes: &[&ChunkMesh],
        projection: &Matrix4<f32>,
        view: &Matrix4<f32>,
    ) -> usize;
}

/// Returns backend buffers once the mesh they belong to is gone.
pub trait BufferAllocator {
    /// Releases one buffer.
    fn release_buffer(&mut self, buffer_id: BufferId);
}
