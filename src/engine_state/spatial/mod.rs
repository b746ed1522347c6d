//! # Spatial Index
//!
//! The chunk manager asks a [`SpatialIndex`] which resident chunks are worth
//! drawing for a given frustum. It only ever adds, removes and queries whole
//! chunks; how the index organises them internally is its own business.
//!
//! [`ChunkBoundsIndex`] keeps one axis-aligned box per non-empty chunk in a hash
//! map. Boxes are either the full chunk cube or, with tight bounds enabled, the
//! box around the chunk's occupied voxels, which lets mostly-empty chunks above
//! the terrain surface be culled more often.

use std::collections::HashMap;

use cgmath::{EuclideanSpace, MetricSpace, Point3};

use crate::engine_state::{
    camera_state::Frustum,
    voxels::chunk::{Chunk, ChunkKey},
};

/// World-space axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Lowest corner
    pub min: Point3<f32>,
    /// Highest corner
    pub max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// The full cube covered by a chunk.
    pub fn of_chunk(key: ChunkKey, size: usize) -> Self {
        let origin = key.origin(size);
        let n = size as f32;
        let min = Point3::new(origin.x as f32, origin.y as f32, origin.z as f32);
        Self::new(min, Point3::new(min.x + n, min.y + n, min.z + n))
    }

    /// Centre point.
    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// `true` if `point` lies inside or on the box.
    pub fn contains(&self, point: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

/// Visibility queries over resident chunks.
pub trait SpatialIndex {
    /// Registers (or re-registers) a chunk. Empty chunks are dropped from the index.
    fn add_chunk(&mut self, key: ChunkKey, chunk: &Chunk);

    /// Forgets a chunk. Unknown keys are ignored.
    fn remove_chunk(&mut self, key: ChunkKey);

    /// World-space box around the occupied voxels of `chunk`, or `None` if it is empty.
    fn compute_tight_bounds(&self, key: ChunkKey, chunk: &Chunk) -> Option<Aabb>;

    /// Keys of indexed chunks that may be visible in `frustum`, nearest to
    /// `observer` first.
    fn find_visible(&self, observer: Point3<f32>, frustum: &Frustum) -> Vec<ChunkKey>;

    /// Number of chunks held.
    fn node_count(&self) -> usize;
}

/// Hash-map backed [`SpatialIndex`].
#[derive(Debug)]
pub struct ChunkBoundsIndex {
    chunk_size: usize,
    tight_bounds: bool,
    entries: HashMap<ChunkKey, Aabb>,
}

impl ChunkBoundsIndex {
    /// Creates an empty index for chunks of edge length `chunk_size`.
    ///
    /// With `tight_bounds` off every chunk is culled by its full cube.
    pub fn new(chunk_size: usize, tight_bounds: bool) -> Self {
        Self {
            chunk_size,
            tight_bounds,
            entries: HashMap::new(),
        }
    }

    /// Culling box stored for `key`.
    pub fn bounds(&self, key: ChunkKey) -> Option<&Aabb> {
        self.entries.get(&key)
    }
}

impl SpatialIndex for ChunkBoundsIndex {
    fn add_chunk(&mut self, key: ChunkKey, chunk: &Chunk) {
        if chunk.is_empty() {
            self.entries.remove(&key);
            return;
        }

        let bounds = if self.tight_bounds {
            self.compute_tight_bounds(key, chunk)
        } else {
            Some(Aabb::of_chunk(key, self.chunk_size))
        };

        if let Some(bounds) = bounds {
            self.entries.insert(key, bounds);
        }
    }

    fn remove_chunk(&mut self, key: ChunkKey) {
        self.entries.remove(&key);
    }

    fn compute_tight_bounds(&self, key: ChunkKey, chunk: &Chunk) -> Option<Aabb> {
        let mut blocks = chunk.iter_blocks();
        let (first, _) = blocks.next()?;
        let (lo, hi) = blocks.fold((first, first), |(lo, hi), (p, _)| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });

        let origin = key.origin(chunk.size());
        Some(Aabb::new(
            Point3::new(
                (origin.x + lo.x) as f32,
                (origin.y + lo.y) as f32,
                (origin.z + lo.z) as f32,
            ),
            Point3::new(
                (origin.x + hi.x + 1) as f32,
                (origin.y + hi.y + 1) as f32,
                (origin.z + hi.z + 1) as f32,
            ),
        ))
    }

    fn find_visible(&self, observer: Point3<f32>, frustum: &Frustum) -> Vec<ChunkKey> {
        let mut visible: Vec<(f32, ChunkKey)> = self
            .entries
            .iter()
            .filter(|(_, bounds)| frustum.intersects_aabb(bounds))
            .map(|(&key, bounds)| (bounds.center().distance2(observer), key))
            .collect();

        visible.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        visible.into_iter().map(|(_, key)| key).collect()
    }

    fn node_count(&self) -> usize {
        self.entries.len()
    }
}
