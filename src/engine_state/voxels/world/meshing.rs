//! Dirty-mesh draining and mesh installation.

use log::{debug, trace};

use crate::engine_state::{
    rendering::{
        meshing::{mesh_chunk, ResidentNeighbors},
        tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        ChunkMesh, MeshData,
    },
    voxels::chunk::{chunk_coord::NEIGHBOR_OFFSETS, Chunk, ChunkKey},
};

use super::{ChunkManager, PendingKind};

impl ChunkManager {
    /// Starts mesh rebuilds for dirty chunks, nearest to the observer first,
    /// up to the per-frame budget.
    ///
    /// Chunks with a mesh already in flight are skipped and stay dirty. Dirty
    /// keys that are no longer resident are dropped.
    ///
    /// # Returns
    /// The number of rebuilds started.
    pub fn rebuild_dirty_meshes(&mut self) -> usize {
        if self.dirty.is_empty() {
            return 0;
        }

        let center = self.observer_chunk;
        let mut candidates: Vec<ChunkKey> = self.dirty.iter().copied().collect();
        candidates.sort_by(|a, b| {
            a.distance(center)
                .total_cmp(&b.distance(center))
                .then(a.cmp(b))
        });

        let mut started = 0;
        for key in candidates {
            if started >= self.config.max_mesh_rebuilds_per_frame {
                break;
            }
            if self.pending.contains(key) {
                continue;
            }
            if !self.loaded.contains(&key) || !self.chunks.contains_key(&key) {
                self.dirty.remove(&key);
                continue;
            }

            if self.config.async_meshing {
                self.submit_mesh(key);
            } else {
                self.build_mesh_now(key);
            }
            started += 1;
        }
        started
    }

    fn build_mesh_now(&mut self, key: ChunkKey) {
        let Some(chunk) = self.chunks.get(&key) else {
            return;
        };
        let version = chunk.version();
        let mesh = mesh_chunk(chunk, &ResidentNeighbors::new(&self.chunks, key));
        self.install_mesh(key, version, mesh);
    }

    fn submit_mesh(&mut self, key: ChunkKey) {
        let Some(chunk) = self.chunks.get(&key) else {
            return;
        };
        let version = chunk.version();
        if chunk.is_empty() {
            self.install_mesh(key, version, MeshData::new());
            return;
        }

        let blocks = chunk.to_buffer();
        let neighbors: Vec<_> = NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&offset| {
                self.chunks
                    .get(&key.offset(offset.into()))
                    .map(|neighbor| (offset, neighbor.to_buffer()))
            })
            .collect();

        let Some(ticket) = self.pending.register(PendingKind::Mesh, key) else {
            return;
        };
        trace!(
            "Submitting mesh of {:?} v{} with {} neighbours (ticket {})",
            key,
            version,
            neighbors.len(),
            ticket
        );
        self.executor.submit(Box::new(ChunkMeshGenerationTask::new(
            key,
            self.chunk_size(),
            ticket,
            version,
            blocks,
            neighbors,
        )));
    }

    /// Applies a finished mesh extraction built from chunk `version`.
    ///
    /// A `None` mesh means the task could not read its buffers; the chunk
    /// stays dirty and is rebuilt on a later frame.
    pub(crate) fn complete_mesh(
        &mut self,
        key: ChunkKey,
        ticket: u64,
        version: u64,
        mesh: Option<MeshData>,
    ) {
        if !self.pending.matches(key, PendingKind::Mesh, ticket) {
            self.counters.discarded_results += 1;
            debug!("Discarded stale mesh of {:?} (ticket {})", key, ticket);
            return;
        }
        self.pending.clear(key);

        if !self.loaded.contains(&key) || !self.chunks.contains_key(&key) {
            self.counters.discarded_results += 1;
            return;
        }
        if let Some(mesh) = mesh {
            self.install_mesh(key, version, mesh);
        }
    }

    /// Uploads `data` as the mesh of `key`, replacing and releasing any
    /// previous mesh. Empty geometry removes the mesh instead.
    ///
    /// The chunk leaves the dirty set only if it is still at `version`.
    fn install_mesh(&mut self, key: ChunkKey, version: u64, data: MeshData) {
        self.refresh_bounds(key);

        if data.is_empty() {
            if let Some(old) = self.meshes.remove(&key) {
                self.release_mesh(old);
            }
        } else {
            let world_offset = key.world_offset(self.chunk_size());
            let handle = self.renderer.create_mesh(&data, world_offset);
            let mesh = ChunkMesh {
                key,
                handle,
                world_offset,
                vertex_count: data.vertex_count(),
                index_count: data.index_count(),
                bounds: self.bounds.get(&key).copied(),
                source_version: version,
            };
            if let Some(old) = self.meshes.insert(key, mesh) {
                self.release_mesh(old);
            }
            self.counters.meshes_built += 1;
        }

        if self.chunks.get(&key).map(Chunk::version) == Some(version) {
            self.dirty.remove(&key);
            if let Some(chunk) = self.chunks.get_mut(&key) {
                chunk.clear_modified();
            }
        }
    }

    /// Frees a mesh's backend state and hands its buffers back to the allocator.
    pub(super) fn release_mesh(&mut self, mesh: ChunkMesh) {
        self.renderer.delete_mesh(&mesh.handle);
        for buffer_id in mesh.handle.buffers {
            self.allocator.release_buffer(buffer_id);
        }
    }
}
