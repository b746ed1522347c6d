use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType, face_color};

/// Unit-cube corners of each face, counter-clockwise when viewed from outside.
///
/// Indexed by `BlockSide as usize`.
const FACE_CORNERS: [[[i32; 3]; 4]; 6] = [
    // FRONT (+Z)
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
    // BACK (-Z)
    [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
    // BOTTOM (-Y)
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
    // TOP (+Y)
    [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]],
    // LEFT (-X)
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
    // RIGHT (+X)
    [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
];

/// Triangle list for one quad, relative to the quad's first vertex.
pub const FACE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Represents a single quad face of a voxel in the mesh.
///
/// Corners are in chunk-local voxel coordinates and wound counter-clockwise
/// as seen from the side the face points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// The four corners, in winding order
    pub corners: [Point3<i32>; 4],
    /// The block the face belongs to
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face `block_side` of the voxel at local `(i, j, k)`.
    pub fn new(i: i32, j: i32, k: i32, block_type: BlockType, block_side: BlockSide) -> Self {
        let corners = FACE_CORNERS[block_side as usize].map(|[x, y, z]| Point3::new(i + x, j + y, k + z));
        Face {
            corners,
            block_type,
            block_side,
        }
    }

    /// Shaded RGBA colour of this face; alpha is left untouched.
    pub fn color(&self) -> [f32; 4] {
        let [r, g, b, a] = face_color(self.block_type, self.block_side);
        let shade = self.block_side.shading();
        [r * shade, g * shade, b * shade, a]
    }

    /// The six indices of this face's two triangles, offset by `base`.
    pub fn indices(base: u32) -> [u32; 6] {
        FACE_INDICES.map(|index| base + index)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    #[test]
    fn winding_faces_outward() {
        for side in BlockSide::all() {
            let face = Face::new(0, 0, 0, BlockType::STONE, side);
            let [a, b, c, _] = face.corners.map(|p| Vector3::new(p.x as f32, p.y as f32, p.z as f32));
            let normal: [f32; 3] = (b - a).cross(c - a).normalize().into();
            assert_eq!(normal, side.normal(), "{:?}", side);
        }
    }

    #[test]
    fn corners_stay_on_the_voxel() {
        let face = Face::new(2, 3, 4, BlockType::DIRT, BlockSide::TOP);
        assert!(face.corners.iter().all(|p| p.y == 4));
        assert!(face.corners.iter().all(|p| (2..=3).contains(&p.x) && (4..=5).contains(&p.z)));
    }

    #[test]
    fn shading_leaves_alpha_alone() {
        let face = Face::new(0, 0, 0, BlockType::WATER, BlockSide::FRONT);
        let base = face_color(BlockType::WATER, BlockSide::FRONT);
        let shaded = face.color();
        assert_eq!(shaded[3], base[3]);
        assert!((shaded[2] - base[2] * 0.6).abs() < 1e-6);
    }
}
