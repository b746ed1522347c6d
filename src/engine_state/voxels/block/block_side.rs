//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, together with the
//! direction, axis and shading data the mesher needs per face.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant indexes per-face tables such as
/// [`BlockProperties::colors`](super::BlockProperties::colors).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Offset to the neighbouring cell this face looks at.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Outward unit normal of this face.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Axis the face is perpendicular to: 0 for X, 1 for Y, 2 for Z.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// Static per-axis brightness applied to face colours.
    ///
    /// X faces keep full brightness, Y faces are dimmed by 20 % and Z faces by 40 %.
    /// This is a fixed directional tint, not lighting.
    pub fn shading(self) -> f32 {
        1.0 - 0.2 * (self.axis() % 3) as f32
    }

    /// Lower-case face name.
    pub fn name(self) -> &'static str {
        match self {
            BlockSide::FRONT => "front",
            BlockSide::BACK => "back",
            BlockSide::BOTTOM => "bottom",
            BlockSide::TOP => "top",
            BlockSide::LEFT => "left",
            BlockSide::RIGHT => "right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_faces_share_an_axis() {
        assert_eq!(BlockSide::LEFT.axis(), BlockSide::RIGHT.axis());
        assert_eq!(BlockSide::TOP.axis(), BlockSide::BOTTOM.axis());
        assert_eq!(BlockSide::FRONT.axis(), BlockSide::BACK.axis());
        assert_eq!(BlockSide::LEFT.offset(), -BlockSide::RIGHT.offset());
    }

    #[test]
    fn shading_dims_by_axis() {
        assert_eq!(BlockSide::RIGHT.shading(), 1.0);
        assert!((BlockSide::TOP.shading() - 0.8).abs() < 1e-6);
        assert!((BlockSide::FRONT.shading() - 0.6).abs() < 1e-6);
    }
}
