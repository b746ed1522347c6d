//! Shared set-up for the integration tests: a chunk manager wired to an
//! inline executor, a flat or custom terrain source and the headless backend.

#![allow(dead_code)]

use std::sync::Arc;

use voxel_stream::{
    config::StreamingConfig,
    core::StResource,
    engine_state::{
        buffer_state::BufferState,
        rendering::{headless::HeadlessStats, HeadlessRenderer},
        spatial::ChunkBoundsIndex,
        task_management::{InlineExecutor, TaskExecutor},
        voxels::{
            block::block_type::BlockType,
            generator::{FlatTerrainGenerator, TerrainGenerator},
            world::{ChunkManager, Collaborators},
        },
    },
};

pub struct Harness {
    pub manager: ChunkManager,
    pub buffers: StResource<BufferState>,
    pub renderer: StResource<HeadlessStats>,
}

/// Every stage inline, small chunks, generous budgets.
pub fn sync_config(chunk_size: usize) -> StreamingConfig {
    StreamingConfig {
        chunk_size,
        render_distance: 2,
        max_loads_per_frame: 1000,
        max_unloads_per_frame: 1000,
        max_mesh_rebuilds_per_frame: 1000,
        ..StreamingConfig::synchronous()
    }
}

/// Nothing but air.
pub fn empty_world() -> FlatTerrainGenerator {
    FlatTerrainGenerator::new(-10_000, BlockType::STONE)
}

/// Stone below `ground_level`.
pub fn flat_world(ground_level: i32) -> FlatTerrainGenerator {
    FlatTerrainGenerator::new(ground_level, BlockType::STONE)
}

pub fn harness(config: StreamingConfig, generator: impl TerrainGenerator + 'static) -> Harness {
    harness_with_executor(config, generator, Box::new(InlineExecutor::new()))
}

pub fn harness_with_executor(
    config: StreamingConfig,
    generator: impl TerrainGenerator + 'static,
    executor: Box<dyn TaskExecutor>,
) -> Harness {
    let buffers = StResource::new(BufferState::new());
    let renderer = HeadlessRenderer::new(buffers.clone());
    let renderer_stats = renderer.stats();

    let collaborators = Collaborators {
        generator: Arc::new(generator),
        executor,
        spatial_index: Box::new(ChunkBoundsIndex::new(
            config.chunk_size,
            config.compute_tight_bounds,
        )),
        renderer: Box::new(renderer),
        allocator: Box::new(buffers.clone()),
    };

    Harness {
        manager: ChunkManager::new(config, collaborators).unwrap(),
        buffers,
        renderer: renderer_stats,
    }
}
