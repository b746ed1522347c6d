//! Background tasks for the rendering system.
//!
//! Mesh extraction is the only rendering work moved off the driving thread.
//! Uploading the result to the graphics backend happens when the chunk
//! manager applies the task's result.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Generates mesh data for chunks in the background

pub mod chunk_mesh_generation_task;
