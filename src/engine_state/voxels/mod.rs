//! # Voxel Engine Core
//!
//! This module contains the voxel side of the streaming core: what a voxel
//! is, how voxels are grouped into chunks, where chunks come from and how the
//! set of resident chunks follows the observer.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: The closed set of block types and their per-face colours
//! * **Chunk**: Fixed-size 3D arrays of blocks stored as flat buffers
//! * **Generator**: Terrain sources that fill a chunk on request
//! * **World**: The `ChunkManager`, which loads, meshes, edits and unloads chunks
//! * **Tasks**: Generation and crater edits as worker tasks
//!
//! ## Data Flow
//!
//! 1. The observer moves and the manager queues loads and unloads
//! 2. Generation tasks produce voxel buffers that become resident chunks
//! 3. New and edited chunks are marked dirty
//! 4. Dirty chunks are meshed, and the meshes are uploaded to the backend
//!
//! ## Thread Safety
//!
//! Chunks are owned by the manager on the driving thread. Worker tasks only
//! ever see copies of chunk buffers, moved into them at submission.

pub mod block;
pub mod chunk;
pub mod generator;
pub mod tasks;
pub mod world;
