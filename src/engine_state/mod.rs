//! # Engine State Module
//!
//! The streaming core: everything that decides which parts of the voxel world
//! exist in memory, what they look like as meshes and which of them get drawn.
//!
//! ## Key Components
//!
//! * `buffer_state` - Named graphics buffers with allocation analytics
//! * `camera_state` - Camera, projection and view frustum
//! * `rendering` - Meshing, mesh tasks and the graphics backend seam
//! * `spatial` - Bounding boxes and visibility queries over resident chunks
//! * `task_management` - Worker threads and the task traits
//! * `voxels` - Blocks, chunks, terrain generation and the chunk manager
//!
//! ## Architecture
//!
//! [`ChunkManager`](voxels::world::ChunkManager) is the central coordinator.
//! It is built from a set of collaborators behind traits (terrain generator,
//! task executor, spatial index, graphics backend, buffer allocator) and is
//! driven once per frame from a single thread.

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod spatial;
pub mod task_management;
pub mod voxels;
