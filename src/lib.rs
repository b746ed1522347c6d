#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Stream
//!
//! The streaming core of a voxel engine: keeps the right chunks of an
//! effectively infinite voxel world resident around a moving observer, meshes
//! them, culls them against the view frustum and applies crater edits, all
//! without stalling the driving loop.
//!
//! ## Key Modules
//!
//! * `config` - Streaming tunables, loaded from JSON
//! * `core` - Shared single-threaded resource containers
//! * `engine_state` - Chunks, meshing, tasks, culling and the chunk manager
//! * `error` - Errors surfaced to the host
//!
//! ## Architecture
//!
//! The chunk manager talks to the rest of an engine through five narrow
//! traits: a terrain generator, a task executor, a spatial index, a graphics
//! backend and a buffer allocator. The crate ships one implementation of
//! each, enough to run the whole pipeline headless.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Matrix4, Point3, SquareMatrix};
//! use voxel_stream::{
//!     config::StreamingConfig,
//!     core::StResource,
//!     engine_state::{buffer_state::BufferState, voxels::world::{ChunkManager, Collaborators}},
//! };
//!
//! let config = StreamingConfig {
//!     chunk_size: 8,
//!     render_distance: 2,
//!     ..StreamingConfig::synchronous()
//! };
//! let buffers = StResource::new(BufferState::new());
//! let collaborators = Collaborators::headless(&config, buffers).unwrap();
//! let mut manager = ChunkManager::new(config, collaborators).unwrap();
//!
//! manager.update(Point3::new(0.0, 0.0, 0.0));
//! manager.render(&Matrix4::identity(), &Matrix4::identity());
//! assert!(manager.stats().resident_chunks > 0);
//! ```

use log::info;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::StreamingConfig;
pub use engine_state::voxels::world::{ChunkManager, ChunkRequest, Collaborators};
pub use error::EngineError;

/// Installs the `env_logger` backend for the `log` facade: output goes to
/// stdout and levels are read from `RUST_LOG`.
///
/// Call once, before constructing a [`ChunkManager`]. Later calls are ignored.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    if log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init()
        .is_ok()
    {
        info!("Logger initialized");
    }
}
