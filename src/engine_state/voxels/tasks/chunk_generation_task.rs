//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which runs a
//! [`TerrainGenerator`] off the driving thread. It is scheduled by the chunk
//! manager when a region enters the load sphere and is not yet resident.

use std::sync::Arc;

use crate::engine_state::{
    task_management::task::{Task, TaskPriority, TaskResult},
    voxels::{
        block::BlockTypeSize,
        chunk::ChunkKey,
        generator::TerrainGenerator,
        world::ChunkManager,
    },
};

/// A task that generates chunk data asynchronously.
///
/// The task carries the ticket of the pending operation that spawned it; the
/// result echoes it back so a generation that was overtaken by an unload and
/// reload of the same key is recognised as stale.
pub struct ChunkGenerationTask {
    /// Shared terrain source
    generator: Arc<dyn TerrainGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    key: ChunkKey,
    /// Edge length in voxels
    size: usize,
    ticket: u64,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The terrain source to run
    /// * `key` - The chunk coordinates where the chunk should be generated
    /// * `size` - Edge length of the chunk
    /// * `ticket` - Ticket of the pending operation
    pub fn new(generator: Arc<dyn TerrainGenerator>, key: ChunkKey, size: usize, ticket: u64) -> Self {
        ChunkGenerationTask {
            generator,
            key,
            size,
            ticket,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn name(&self) -> &'static str {
        "chunk_generation"
    }

    fn priority(&self) -> TaskPriority {
        TaskPriority::High
    }

    fn process(self: Box<Self>) -> Box<dyn TaskResult> {
        let chunk = self.generator.generate(self.key, self.size);

        Box::new(ChunkGenerationTaskResult {
            key: self.key,
            ticket: self.ticket,
            blocks: chunk.into_buffer(),
        })
    }
}

/// The result of a chunk generation task: the generated grid as a flat buffer.
pub struct ChunkGenerationTaskResult {
    key: ChunkKey,
    ticket: u64,
    blocks: Box<[BlockTypeSize]>,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(self: Box<Self>, manager: &mut ChunkManager) {
        manager.complete_generation(self.key, self.ticket, self.blocks);
    }
}

