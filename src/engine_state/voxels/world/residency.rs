//! Residency control: which chunks are loaded around the observer.
//!
//! Chunks inside the load sphere are queued for loading nearest first; chunks
//! that drift past the larger unload sphere are queued for unloading farthest
//! first. The gap between the two radii keeps chunks near the edge from being
//! loaded and unloaded on alternate frames. Both queues are drained under
//! their per-frame budget and the rest carries over.

use std::collections::HashSet;

use cgmath::{Point3, Vector3};
use log::{debug, warn};

use crate::engine_state::voxels::{
    block::BlockTypeSize,
    chunk::{Chunk, ChunkKey},
    tasks::chunk_generation_task::ChunkGenerationTask,
};

use super::{ChunkManager, ChunkRequest, PendingKind};

/// What one residency pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResidencyUpdate {
    /// Loads taken off the queue this frame
    pub loads_started: usize,
    /// Chunks unloaded this frame
    pub unloads: usize,
}

impl ChunkManager {
    /// Recomputes the wanted set around `observer` and works through the load
    /// and unload queues within the frame's budgets.
    pub fn update_residency(&mut self, observer: Point3<f32>) -> ResidencyUpdate {
        let center = ChunkKey::from_world(observer, self.chunk_size());
        self.observer = observer;
        self.observer_chunk = center;

        self.queue_loads(center, self.config.load_radius());
        self.queue_unloads(center, self.config.unload_radius());

        let loads = self.config.max_loads_per_frame.min(self.load_queue.len());
        let to_load: Vec<ChunkKey> = self.load_queue.drain(..loads).collect();
        for &key in &to_load {
            self.get_or_create_chunk(key);
        }

        let unloads = self.config.max_unloads_per_frame.min(self.unload_queue.len());
        let to_unload: Vec<ChunkKey> = self.unload_queue.drain(..unloads).collect();
        for &key in &to_unload {
            self.unload_chunk(key);
        }

        ResidencyUpdate {
            loads_started: to_load.len(),
            unloads: to_unload.len(),
        }
    }

    fn queue_loads(&mut self, center: ChunkKey, load_radius: f32) {
        let horizontal = load_radius.ceil() as i32;
        let vertical = ((load_radius / 2.0).ceil() as i32).max(1);

        let loaded = &self.loaded;
        self.load_queue
            .retain(|key| !loaded.contains(key) && key.distance(center) <= load_radius);

        let mut queued: HashSet<ChunkKey> = self.load_queue.iter().copied().collect();
        for dy in -vertical..=vertical {
            for dz in -horizontal..=horizontal {
                for dx in -horizontal..=horizontal {
                    let key = center.offset(Vector3::new(dx, dy, dz));
                    if key.distance(center) <= load_radius
                        && !self.loaded.contains(&key)
                        && queued.insert(key)
                    {
                        self.load_queue.push(key);
                    }
                }
            }
        }

        self.load_queue.sort_by(|a, b| {
            a.distance(center)
                .total_cmp(&b.distance(center))
                .then(a.cmp(b))
        });
    }

    fn queue_unloads(&mut self, center: ChunkKey, unload_radius: f32) {
        let loaded = &self.loaded;
        self.unload_queue
            .retain(|key| loaded.contains(key) && key.distance(center) > unload_radius);

        let queued: HashSet<ChunkKey> = self.unload_queue.iter().copied().collect();
        let mut far: Vec<ChunkKey> = self
            .loaded
            .iter()
            .filter(|key| key.distance(center) > unload_radius && !queued.contains(key))
            .copied()
            .collect();
        self.unload_queue.append(&mut far);

        self.unload_queue.sort_by(|a, b| {
            b.distance(center)
                .total_cmp(&a.distance(center))
                .then(a.cmp(b))
        });
    }

    /// Returns the chunk if it is resident, otherwise starts loading it.
    ///
    /// With asynchronous generation the load is submitted as a task and
    /// [`ChunkRequest::Pending`] is returned until its result is applied. A key
    /// that already has a generation in flight is never submitted twice. With
    /// synchronous generation the chunk is generated on the spot.
    pub fn get_or_create_chunk(&mut self, key: ChunkKey) -> ChunkRequest<'_> {
        if self.chunks.contains_key(&key) {
            return self.peek_chunk(key);
        }
        if self.pending.contains(key) {
            return ChunkRequest::Pending;
        }

        self.loaded.insert(key);

        if self.config.async_generation {
            if let Some(ticket) = self.pending.register(PendingKind::Generate, key) {
                debug!("Submitting generation of {:?} (ticket {})", key, ticket);
                self.executor.submit(Box::new(ChunkGenerationTask::new(
                    self.generator.clone(),
                    key,
                    self.chunk_size(),
                    ticket,
                )));
            }
            return ChunkRequest::Pending;
        }

        let chunk = self.generator.generate(key, self.chunk_size());
        self.insert_generated(key, chunk);
        self.peek_chunk(key)
    }

    /// Looks a chunk up without starting any work.
    pub fn peek_chunk(&self, key: ChunkKey) -> ChunkRequest<'_> {
        match self.chunks.get(&key) {
            Some(chunk) => ChunkRequest::Ready(chunk),
            None if self
                .pending
                .get(key)
                .is_some_and(|op| op.kind == PendingKind::Generate) =>
            {
                ChunkRequest::Pending
            }
            None => ChunkRequest::Absent,
        }
    }

    /// Applies a finished generation.
    ///
    /// The result is dropped when the chunk was unloaded since submission, when
    /// `ticket` is not the generation pending for the key, or when the chunk
    /// is already resident.
    pub(crate) fn complete_generation(
        &mut self,
        key: ChunkKey,
        ticket: u64,
        blocks: Box<[BlockTypeSize]>,
    ) {
        let current = self.pending.matches(key, PendingKind::Generate, ticket);
        if !current || !self.loaded.contains(&key) || self.chunks.contains_key(&key) {
            if current {
                self.pending.clear(key);
            }
            self.counters.discarded_results += 1;
            debug!("Discarded stale generation of {:?} (ticket {})", key, ticket);
            return;
        }

        self.pending.clear(key);
        match Chunk::from_buffer(key, self.chunk_size(), blocks) {
            Ok(chunk) => self.insert_generated(key, chunk),
            Err(err) => {
                warn!("Discarding generated chunk {:?}: {}", key, err);
                self.loaded.remove(&key);
            }
        }
    }

    fn insert_generated(&mut self, key: ChunkKey, mut chunk: Chunk) {
        if chunk.size() != self.chunk_size() {
            warn!(
                "Generator returned a chunk of size {} for {:?}, expected {}",
                chunk.size(),
                key,
                self.chunk_size()
            );
            self.loaded.remove(&key);
            return;
        }

        chunk.position = key;
        chunk.clear_modified();
        self.chunks.insert(key, chunk);
        self.refresh_bounds(key);
        self.dirty.insert(key);
        self.counters.chunks_generated += 1;
        debug!("Chunk {:?} is resident", key);
    }

    /// Drops a chunk and everything attached to it: mesh (with its backend
    /// resources), spatial-index entry, bounds, dirty and pending state, and
    /// queue entries. A task still running for the chunk is not waited for;
    /// its result will be discarded.
    ///
    /// # Returns
    /// `true` if the chunk was loaded or resident.
    pub fn unload_chunk(&mut self, key: ChunkKey) -> bool {
        let was_loaded = self.loaded.remove(&key);
        let was_resident = self.chunks.remove(&key).is_some();

        if let Some(mesh) = self.meshes.remove(&key) {
            self.release_mesh(mesh);
        }
        self.spatial_index.remove_chunk(key);
        self.bounds.remove(&key);
        self.dirty.remove(&key);
        self.pending.clear(key);
        self.load_queue.retain(|queued| *queued != key);
        self.unload_queue.retain(|queued| *queued != key);

        if was_resident {
            self.counters.chunks_unloaded += 1;
            debug!("Unloaded chunk {:?}", key);
        }
        was_loaded || was_resident
    }
}
