//! # Camera State Management
//!
//! This module handles the observer's view of the world:
//! - Camera position and orientation
//! - View and projection matrix calculations
//! - View frustum extraction for chunk culling
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `Projection`: Manages the camera's projection matrix
//! - `Frustum`: Clip planes of a view-projection matrix

pub mod camera;
pub mod frustum;

pub use camera::{Camera, Projection, OPENGL_TO_WGPU_MATRIX};
pub use frustum::Frustum;
