//! # Core Module
//!
//! Small resource containers shared by the streaming core.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted resource with interior mutability,
//!   used to share GPU-side bookkeeping between the renderer and the chunk manager
//!
//! Nothing in here is `Send`. Data that crosses into worker tasks is moved into the
//! task by value instead (see [`crate::engine_state::task_management`]).

pub mod st_resource;

pub use st_resource::StResource;
