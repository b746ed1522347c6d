//! # Voxel Task System
//!
//! Tasks that produce or rewrite voxel data off the driving thread. Both run
//! at high priority so terrain near the observer and player edits are not
//! held up behind queued mesh work.
//!
//! - `ChunkGenerationTask`: Runs the terrain generator for one chunk
//! - `SphereEditTask`: Carves a crater out of snapshots of resident chunks

pub mod chunk_generation_task;
pub mod sphere_edit_task;
