//! # Chunk Lifecycle Manager
//!
//! The `ChunkManager` owns every resident chunk and decides, frame by frame,
//! which chunks should be resident, which meshes are stale and what gets drawn.
//!
//! ## Key Components
//!
//! * `residency` - Load and unload around the observer under per-frame budgets
//! * `meshing` - Dirty-mesh draining, mesh installation and resource release
//! * `editing` - Voxel reads and writes, crater edits and the ray cast
//! * `pending` - The one-operation-per-chunk registry with staleness tickets
//!
//! ## Frame Flow
//!
//! ```text
//! process_completed_tasks -> update_residency -> rebuild_dirty_meshes -> render
//! ```
//!
//! [`ChunkManager::update`] runs the first three steps in order.
//!
//! ## Threading
//!
//! The manager lives on one driving thread and is never locked. Generation,
//! meshing and crater edits run as tasks on a [`TaskExecutor`]; each task owns
//! copies of the voxel buffers it needs and its result is applied here once
//! collected. A result whose chunk was unloaded, or whose ticket no longer
//! matches the pending operation for the chunk, is dropped.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use cgmath::{Matrix4, Point3};
use log::{info, trace};
use web_time::Instant;

use crate::{
    config::StreamingConfig,
    core::StResource,
    engine_state::{
        buffer_state::BufferState,
        camera_state::Frustum,
        rendering::{BufferAllocator, ChunkMesh, GraphicsBackend, HeadlessRenderer},
        spatial::{Aabb, ChunkBoundsIndex, SpatialIndex},
        task_management::{executor_for, TaskExecutor},
        voxels::{
            chunk::{Chunk, ChunkKey},
            generator::{PerlinTerrainGenerator, TerrainGenerator},
        },
    },
    error::EngineError,
};

mod editing;
mod meshing;
mod pending;
mod residency;
mod stats;

pub use editing::{RayHit, SphereEditOutcome};
pub use pending::{PendingKind, PendingOperation};
pub use residency::ResidencyUpdate;
pub use stats::{FrameStats, WorldStats};

use pending::PendingRegistry;

/// The services a [`ChunkManager`] is built from.
pub struct Collaborators {
    /// Terrain source, shared with generation tasks
    pub generator: Arc<dyn TerrainGenerator>,
    /// Where tasks run
    pub executor: Box<dyn TaskExecutor>,
    /// Visibility queries
    pub spatial_index: Box<dyn SpatialIndex>,
    /// Mesh upload and draw
    pub renderer: Box<dyn GraphicsBackend>,
    /// Receives the buffers of discarded meshes
    pub allocator: Box<dyn BufferAllocator>,
}

impl Collaborators {
    /// Perlin terrain, the executor `config.worker_threads` asks for, a
    /// [`ChunkBoundsIndex`] and a [`HeadlessRenderer`] allocating from
    /// `buffer_state`.
    ///
    /// # Errors
    /// [`EngineError::Io`] if a worker thread cannot be spawned.
    pub fn headless(
        config: &StreamingConfig,
        buffer_state: StResource<BufferState>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            generator: Arc::new(PerlinTerrainGenerator::new(config.seed)),
            executor: executor_for(config.worker_threads)?,
            spatial_index: Box::new(ChunkBoundsIndex::new(
                config.chunk_size,
                config.compute_tight_bounds,
            )),
            renderer: Box::new(HeadlessRenderer::new(buffer_state.clone())),
            allocator: Box::new(buffer_state),
        })
    }
}

/// Answer to a chunk lookup.
#[derive(Debug)]
pub enum ChunkRequest<'a> {
    /// The chunk is resident
    Ready(&'a Chunk),
    /// Generation has been submitted and not yet applied
    Pending,
    /// Not resident and nothing in flight
    Absent,
}

impl<'a> ChunkRequest<'a> {
    /// The chunk, if it is resident.
    pub fn chunk(&self) -> Option<&'a Chunk> {
        match self {
            ChunkRequest::Ready(chunk) => Some(*chunk),
            _ => None,
        }
    }

    /// `true` for [`ChunkRequest::Ready`].
    pub fn is_ready(&self) -> bool {
        matches!(self, ChunkRequest::Ready(_))
    }
}

#[derive(Debug, Default)]
struct Counters {
    discarded_results: u64,
    chunks_generated: u64,
    chunks_unloaded: u64,
    meshes_built: u64,
    voxels_cleared: u64,
    visible_last_frame: usize,
    culled_last_frame: usize,
}

/// Streams chunks around an observer.
pub struct ChunkManager {
    config: StreamingConfig,
    generator: Arc<dyn TerrainGenerator>,
    executor: Box<dyn TaskExecutor>,
    spatial_index: Box<dyn SpatialIndex>,
    renderer: Box<dyn GraphicsBackend>,
    allocator: Box<dyn BufferAllocator>,

    chunks: HashMap<ChunkKey, Chunk>,
    meshes: HashMap<ChunkKey, ChunkMesh>,
    bounds: HashMap<ChunkKey, Aabb>,
    loaded: HashSet<ChunkKey>,
    dirty: HashSet<ChunkKey>,
    pending: PendingRegistry,
    load_queue: Vec<ChunkKey>,
    unload_queue: Vec<ChunkKey>,

    observer: Point3<f32>,
    observer_chunk: ChunkKey,
    counters: Counters,
}

impl ChunkManager {
    /// Validates `config`, initializes the graphics backend and returns an
    /// empty manager.
    ///
    /// # Errors
    /// * [`EngineError::InvalidConfig`] if the configuration is inconsistent
    /// * [`EngineError::BackendUnavailable`] if the backend cannot start; this
    ///   is not retried
    pub fn new(config: StreamingConfig, collaborators: Collaborators) -> Result<Self, EngineError> {
        config.validate()?;

        let Collaborators {
            generator,
            executor,
            spatial_index,
            mut renderer,
            allocator,
        } = collaborators;
        renderer.initialize()?;

        info!(
            "Chunk manager ready: chunk size {}, load radius {:.2}, unload radius {:.2}",
            config.chunk_size,
            config.load_radius(),
            config.unload_radius()
        );

        Ok(Self {
            config,
            generator,
            executor,
            spatial_index,
            renderer,
            allocator,
            chunks: HashMap::new(),
            meshes: HashMap::new(),
            bounds: HashMap::new(),
            loaded: HashSet::new(),
            dirty: HashSet::new(),
            pending: PendingRegistry::default(),
            load_queue: Vec::new(),
            unload_queue: Vec::new(),
            observer: Point3::new(0.0, 0.0, 0.0),
            observer_chunk: ChunkKey::default(),
            counters: Counters::default(),
        })
    }

    /// One frame of streaming: applies finished task results, updates
    /// residency around `observer` and starts budgeted mesh rebuilds.
    pub fn update(&mut self, observer: Point3<f32>) -> FrameStats {
        let start = Instant::now();

        let completed_results = self.process_completed_tasks();
        let residency = self.update_residency(observer);
        let mesh_rebuilds = self.rebuild_dirty_meshes();

        FrameStats {
            completed_results,
            loads_started: residency.loads_started,
            unloads: residency.unloads,
            mesh_rebuilds,
            elapsed: start.elapsed(),
        }
    }

    /// Applies every task result the executor has finished, in arrival order.
    ///
    /// # Returns
    /// The number of results applied (stale ones included).
    pub fn process_completed_tasks(&mut self) -> usize {
        let results = self.executor.collect_completed();
        let count = results.len();
        for result in results {
            result.handle_result(self);
        }
        if count > 0 {
            trace!("Applied {} task results", count);
        }
        count
    }

    /// Draws the meshes of the chunks the spatial index reports inside the
    /// view frustum, nearest first.
    ///
    /// # Returns
    /// The number of meshes the backend drew.
    pub fn render(&mut self, projection: &Matrix4<f32>, view: &Matrix4<f32>) -> usize {
        let frustum = Frustum::from_matrix(&(*projection * *view));
        let visible = self.spatial_index.find_visible(self.observer, &frustum);

        let batch: Vec<&ChunkMesh> = visible.iter().filter_map(|key| self.meshes.get(key)).collect();

        self.counters.visible_last_frame = batch.len();
        self.counters.culled_last_frame = self.meshes.len().saturating_sub(batch.len());

        if batch.is_empty() {
            return 0;
        }
        self.renderer.render_batch(&batch, projection, view)
    }

    /// Current counters.
    pub fn stats(&self) -> WorldStats {
        let (total_vertices, total_indices) = self
            .meshes
            .values()
            .fold((0, 0), |(v, i), mesh| (v + mesh.vertex_count, i + mesh.index_count));

        WorldStats {
            resident_chunks: self.chunks.len(),
            meshes: self.meshes.len(),
            pending_operations: self.pending.len(),
            dirty_chunks: self.dirty.len(),
            loaded_chunks: self.loaded.len(),
            queued_loads: self.load_queue.len(),
            queued_unloads: self.unload_queue.len(),
            spatial_nodes: self.spatial_index.node_count(),
            total_vertices,
            total_indices,
            visible_last_frame: self.counters.visible_last_frame,
            culled_last_frame: self.counters.culled_last_frame,
            discarded_results: self.counters.discarded_results,
            tasks_in_flight: self.executor.tasks_in_flight(),
            chunks_generated: self.counters.chunks_generated,
            chunks_unloaded: self.counters.chunks_unloaded,
            meshes_built: self.counters.meshes_built,
            voxels_cleared: self.counters.voxels_cleared,
        }
    }

    /// The configuration the manager was built with.
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Last observer position passed to [`ChunkManager::update_residency`].
    pub fn observer(&self) -> Point3<f32> {
        self.observer
    }

    /// `true` if the chunk's voxel data is resident.
    pub fn has_chunk(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    /// `true` if the chunk should be resident, generated or not.
    pub fn is_loaded(&self, key: ChunkKey) -> bool {
        self.loaded.contains(&key)
    }

    /// `true` if the chunk is waiting for a mesh rebuild.
    pub fn is_dirty(&self, key: ChunkKey) -> bool {
        self.dirty.contains(&key)
    }

    /// The operation in flight for `key`, if any.
    pub fn pending_operation(&self, key: ChunkKey) -> Option<PendingOperation> {
        self.pending.get(key).copied()
    }

    /// Uploaded mesh of a chunk.
    pub fn mesh(&self, key: ChunkKey) -> Option<&ChunkMesh> {
        self.meshes.get(&key)
    }

    /// Tight bounds of a chunk's occupied voxels.
    pub fn bounds(&self, key: ChunkKey) -> Option<Aabb> {
        self.bounds.get(&key).copied()
    }

    /// Keys of every resident chunk, in no particular order.
    pub fn resident_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Re-registers a chunk with the spatial index and recomputes its tight
    /// bounds after its content changed.
    fn refresh_bounds(&mut self, key: ChunkKey) {
        let Some(chunk) = self.chunks.get(&key) else {
            return;
        };

        self.spatial_index.remove_chunk(key);
        self.spatial_index.add_chunk(key, chunk);

        let bounds = if self.config.compute_tight_bounds {
            self.spatial_index.compute_tight_bounds(key, chunk)
        } else {
            None
        };
        match bounds {
            Some(bounds) => {
                self.bounds.insert(key, bounds);
            }
            None => {
                self.bounds.remove(&key);
            }
        }
    }
}
