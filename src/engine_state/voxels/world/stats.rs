//! Read-only counters for a presentation layer to poll.

use web_time::Duration;

/// Snapshot of the chunk manager's state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks with generated voxel data
    pub resident_chunks: usize,
    /// Chunks with an uploaded mesh
    pub meshes: usize,
    /// Generation and mesh operations awaiting their result
    pub pending_operations: usize,
    /// Chunks waiting for a mesh rebuild
    pub dirty_chunks: usize,
    /// Chunks that should be resident, generated or not
    pub loaded_chunks: usize,
    /// Loads waiting for budget
    pub queued_loads: usize,
    /// Unloads waiting for budget
    pub queued_unloads: usize,
    /// Chunks held by the spatial index
    pub spatial_nodes: usize,
    /// Vertices across all meshes
    pub total_vertices: usize,
    /// Indices across all meshes
    pub total_indices: usize,
    /// Meshes handed to the backend by the last `render`
    pub visible_last_frame: usize,
    /// Meshes rejected by the frustum in the last `render`
    pub culled_last_frame: usize,
    /// Task results dropped because their chunk moved on
    pub discarded_results: u64,
    /// Tasks submitted and not yet collected
    pub tasks_in_flight: usize,
    /// Chunks generated since start-up
    pub chunks_generated: u64,
    /// Chunks unloaded since start-up
    pub chunks_unloaded: u64,
    /// Meshes uploaded since start-up
    pub meshes_built: u64,
    /// Voxels cleared by sphere edits since start-up
    pub voxels_cleared: u64,
}

/// What one call to `ChunkManager::update` did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Task results applied
    pub completed_results: usize,
    /// Loads started (generation submitted or run inline)
    pub loads_started: usize,
    /// Chunks unloaded
    pub unloads: usize,
    /// Mesh rebuilds started
    pub mesh_rebuilds: usize,
    /// Wall time spent in the update
    pub elapsed: Duration,
}
