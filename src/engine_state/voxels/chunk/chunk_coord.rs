//! # Chunk Coordinates
//!
//! Conversion between world voxel coordinates and chunk-space keys.
//!
//! World coordinates are signed. Chunk keys use floor division and local
//! coordinates use the positive modulo, so voxel `-1` lives at local index
//! `size - 1` of chunk `-1`, not at local `-1` of chunk `0`.

use cgmath::{Point3, Vector3};

/// Integer identity of a chunk in chunk space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Chunk-space X
    pub x: i32,
    /// Chunk-space Y
    pub y: i32,
    /// Chunk-space Z
    pub z: i32,
}

impl ChunkKey {
    /// Creates a key from chunk-space coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Key of the chunk containing a world voxel.
    pub fn from_voxel(voxel: Point3<i32>, size: usize) -> Self {
        let n = size as i32;
        Self {
            x: voxel.x.div_euclid(n),
            y: voxel.y.div_euclid(n),
            z: voxel.z.div_euclid(n),
        }
    }

    /// Key of the chunk containing a continuous world position.
    pub fn from_world(position: Point3<f32>, size: usize) -> Self {
        Self::from_voxel(
            Point3::new(
                position.x.floor() as i32,
                position.y.floor() as i32,
                position.z.floor() as i32,
            ),
            size,
        )
    }

    /// Local coordinates of a world voxel inside its chunk, each in `0..size`.
    pub fn local(voxel: Point3<i32>, size: usize) -> Point3<i32> {
        let n = size as i32;
        Point3::new(voxel.x.rem_euclid(n), voxel.y.rem_euclid(n), voxel.z.rem_euclid(n))
    }

    /// World voxel coordinate of this chunk's local origin.
    pub fn origin(self, size: usize) -> Point3<i32> {
        let n = size as i32;
        Point3::new(self.x * n, self.y * n, self.z * n)
    }

    /// World-space translation applied to this chunk's mesh.
    pub fn world_offset(self, size: usize) -> Vector3<f32> {
        let n = size as f32;
        Vector3::new(self.x as f32 * n, self.y as f32 * n, self.z as f32 * n)
    }

    /// The key displaced by `offset` chunks.
    pub fn offset(self, offset: Vector3<i32>) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }

    /// Euclidean distance in chunk space.
    pub fn distance(self, other: ChunkKey) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Largest per-axis difference in chunk space.
    pub fn chebyshev_distance(self, other: ChunkKey) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// The 26 keys surrounding this one.
    pub fn neighbors_26(self) -> impl Iterator<Item = ChunkKey> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&[dx, dy, dz]| ChunkKey::new(self.x + dx, self.y + dy, self.z + dz))
    }
}

impl From<Point3<i32>> for ChunkKey {
    fn from(point: Point3<i32>) -> Self {
        Self::new(point.x, point.y, point.z)
    }
}

/// Offsets to the 26 surrounding chunks, excluding `[0, 0, 0]`.
pub const NEIGHBOR_OFFSETS: [[i32; 3]; 26] = {
    let mut offsets = [[0; 3]; 26];
    let mut index = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                if !(dx == 0 && dy == 0 && dz == 0) {
                    offsets[index] = [dx, dy, dz];
                    index += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    offsets
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_voxels_floor_into_previous_chunk() {
        let voxel = Point3::new(-1, -32, -33);
        assert_eq!(ChunkKey::from_voxel(voxel, 32), ChunkKey::new(-1, -1, -2));
        assert_eq!(ChunkKey::local(voxel, 32), Point3::new(31, 0, 31));
    }

    #[test]
    fn origin_plus_local_is_the_voxel() {
        for &(x, y, z) in &[(0, 0, 0), (5, -7, 40), (-1, -1, -1), (-65, 64, 3)] {
            let voxel = Point3::new(x, y, z);
            let key = ChunkKey::from_voxel(voxel, 16);
            let origin = key.origin(16);
            let local = ChunkKey::local(voxel, 16);
            assert_eq!(
                Point3::new(origin.x + local.x, origin.y + local.y, origin.z + local.z),
                voxel
            );
        }
    }

    #[test]
    fn world_positions_floor_before_dividing() {
        assert_eq!(
            ChunkKey::from_world(Point3::new(-0.25, 3.9, 4.0), 4),
            ChunkKey::new(-1, 0, 1)
        );
    }

    #[test]
    fn neighborhood_has_26_distinct_keys() {
        let key = ChunkKey::new(3, -2, 7);
        let neighbors: std::collections::HashSet<_> = key.neighbors_26().collect();
        assert_eq!(neighbors.len(), 26);
        assert!(!neighbors.contains(&key));
        assert!(neighbors.iter().all(|n| n.chebyshev_distance(key) == 1));
    }
}
