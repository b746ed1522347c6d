//! # Sphere Edit Task
//!
//! Carves a sphere of air out of copies of the resident chunks it touches.
//! The copies are taken together with each chunk's version so the chunk
//! manager can tell, once the result comes back, whether a chunk changed while
//! the task was running.

use cgmath::Point3;
use log::warn;

use crate::engine_state::{
    task_management::task::{Task, TaskPriority, TaskResult},
    voxels::{
        block::BlockTypeSize,
        chunk::{carve_sphere, Chunk, ChunkKey},
        world::ChunkManager,
    },
};

/// A chunk snapshot handed to a [`SphereEditTask`].
#[derive(Debug)]
pub struct EditTarget {
    /// Chunk the snapshot was taken from
    pub key: ChunkKey,
    /// Chunk version at snapshot time
    pub version: u64,
    /// Copied voxel buffer
    pub blocks: Box<[BlockTypeSize]>,
}

/// A carved snapshot coming back from a [`SphereEditTask`].
#[derive(Debug)]
pub struct EditedChunk {
    /// Chunk the snapshot was taken from
    pub key: ChunkKey,
    /// Chunk version the carve was applied to
    pub base_version: u64,
    /// Carved voxel buffer
    pub blocks: Box<[BlockTypeSize]>,
    /// Voxels cleared in this chunk
    pub cleared: usize,
}

/// Clears every voxel within `radius` of `center` (world voxel coordinates)
/// in each target.
///
/// Targets whose buffer has the wrong length are dropped with a warning.
pub fn carve_targets(
    center: Point3<i32>,
    radius: f32,
    size: usize,
    targets: Vec<EditTarget>,
) -> Vec<EditedChunk> {
    targets
        .into_iter()
        .filter_map(|target| {
            let mut chunk = match Chunk::from_buffer(target.key, size, target.blocks) {
                Ok(chunk) => chunk,
                Err(err) => {
                    warn!("Skipping sphere edit of {:?}: {}", target.key, err);
                    return None;
                }
            };
            let cleared = carve_sphere(&mut chunk, center, radius);
            Some(EditedChunk {
                key: target.key,
                base_version: target.version,
                blocks: chunk.into_buffer(),
                cleared,
            })
        })
        .collect()
}

/// A task that applies a crater edit to chunk snapshots.
pub struct SphereEditTask {
    center: Point3<i32>,
    radius: f32,
    size: usize,
    targets: Vec<EditTarget>,
}

impl SphereEditTask {
    /// Creates a new sphere edit task.
    ///
    /// # Arguments
    /// * `center` - Sphere centre in world voxel coordinates
    /// * `radius` - Sphere radius in voxels
    /// * `size` - Edge length of every target chunk
    /// * `targets` - Snapshots of the chunks the sphere may touch
    pub fn new(center: Point3<i32>, radius: f32, size: usize, targets: Vec<EditTarget>) -> Self {
        SphereEditTask {
            center,
            radius,
            size,
            targets,
        }
    }
}

impl Task for SphereEditTask {
    fn name(&self) -> &'static str {
        "sphere_edit"
    }

    fn priority(&self) -> TaskPriority {
        TaskPriority::High
    }

    fn process(self: Box<Self>) -> Box<dyn TaskResult> {
        let SphereEditTask {
            center,
            radius,
            size,
            targets,
        } = *self;

        Box::new(SphereEditTaskResult {
            center,
            radius,
            chunks: carve_targets(center, radius, size, targets),
        })
    }
}

/// The carved snapshots of one sphere edit.
pub struct SphereEditTaskResult {
    center: Point3<i32>,
    radius: f32,
    chunks: Vec<EditedChunk>,
}

impl TaskResult for SphereEditTaskResult {
    fn handle_result(self: Box<Self>, manager: &mut ChunkManager) {
        manager.complete_sphere_edit(self.center, self.radius, self.chunks);
    }
}
