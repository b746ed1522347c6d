//! Voxel access, crater edits and the ray cast.
//!
//! All coordinates here are world voxel coordinates. Reads of unloaded
//! regions see air and writes to them are ignored.

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, warn};

use crate::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{carve_sphere, ChunkKey},
    tasks::sphere_edit_task::{EditTarget, EditedChunk, SphereEditTask},
};

use super::ChunkManager;

/// First occupied voxel along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World coordinates of the voxel
    pub voxel: Point3<i32>,
    /// What was hit
    pub block: BlockType,
    /// Distance along the ray to the first sample inside the voxel
    pub distance: f32,
    /// Unit axis normal of the face the ray most likely entered through
    pub normal: Vector3<f32>,
}

/// How a crater edit was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SphereEditOutcome {
    /// Applied on the spot
    Applied {
        /// Voxels that were occupied and are now air
        cleared: usize,
    },
    /// Handed to a worker; takes effect when its result is applied
    Submitted {
        /// Resident chunks the task carves
        chunks: usize,
    },
}

impl ChunkManager {
    /// Block at a world voxel position, `AIR` if its chunk is not resident.
    pub fn read_voxel(&self, x: i32, y: i32, z: i32) -> BlockType {
        let voxel = Point3::new(x, y, z);
        let size = self.chunk_size();
        match self.chunks.get(&ChunkKey::from_voxel(voxel, size)) {
            Some(chunk) => {
                let local = ChunkKey::local(voxel, size);
                chunk.get_block(local.x, local.y, local.z)
            }
            None => BlockType::AIR,
        }
    }

    /// Sets the block at a world voxel position.
    ///
    /// If the cell changed, the chunk is marked dirty, and so is each resident
    /// face-adjacent chunk when the voxel lies on the shared face.
    ///
    /// # Returns
    /// `false` if the chunk is not resident; nothing is written then.
    pub fn write_voxel(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let voxel = Point3::new(x, y, z);
        let size = self.chunk_size();
        let key = ChunkKey::from_voxel(voxel, size);
        let local = ChunkKey::local(voxel, size);

        let Some(chunk) = self.chunks.get_mut(&key) else {
            return false;
        };
        let version = chunk.version();
        chunk.set_block(local.x, local.y, local.z, block);
        if chunk.version() == version {
            return true;
        }
        self.dirty.insert(key);

        let last = size as i32 - 1;
        let axes = [
            (local.x, Vector3::unit_x()),
            (local.y, Vector3::unit_y()),
            (local.z, Vector3::unit_z()),
        ];
        for (coordinate, axis) in axes {
            if coordinate == 0 {
                self.mark_if_resident(key.offset(-axis));
            }
            if coordinate == last {
                self.mark_if_resident(key.offset(axis));
            }
        }
        true
    }

    /// Marks a resident chunk and every resident chunk of its 26-neighbourhood
    /// for a mesh rebuild. Marking an already dirty chunk changes nothing.
    pub fn mark_chunk_dirty(&mut self, key: ChunkKey) {
        self.mark_if_resident(key);
        for neighbor in key.neighbors_26() {
            self.mark_if_resident(neighbor);
        }
    }

    fn mark_if_resident(&mut self, key: ChunkKey) {
        if self.chunks.contains_key(&key) {
            self.dirty.insert(key);
        }
    }

    /// Clears every voxel within `radius` of `floor(center)`.
    ///
    /// With asynchronous editing the resident chunks the sphere can reach are
    /// copied into a high-priority task. Chunks that change while the task
    /// runs are carved again directly when the result arrives, so no edit is
    /// lost either way. A negative or non-finite radius clears nothing.
    pub fn apply_sphere_edit(&mut self, center: Point3<f32>, radius: f32) -> SphereEditOutcome {
        if !radius.is_finite() || radius < 0.0 {
            return SphereEditOutcome::Applied { cleared: 0 };
        }
        let center = Point3::new(
            center.x.floor() as i32,
            center.y.floor() as i32,
            center.z.floor() as i32,
        );

        if self.config.async_editing {
            self.submit_sphere_edit(center, radius)
        } else {
            SphereEditOutcome::Applied {
                cleared: self.carve_now(center, radius),
            }
        }
    }

    fn carve_now(&mut self, center: Point3<i32>, radius: f32) -> usize {
        // Only resident voxels can change, so the sphere's bounding cube is
        // clipped to the resident extent before walking it.
        let Some((min, max)) = self.resident_extent() else {
            return 0;
        };
        let r = radius.ceil() as i64;
        let r2 = f64::from(radius) * f64::from(radius);
        let span = |c: i32, lo: i64, hi: i64| {
            let c = i64::from(c);
            (c.saturating_sub(r).max(lo), c.saturating_add(r).min(hi))
        };
        let (x0, x1) = span(center.x, min.x, max.x);
        let (y0, y1) = span(center.y, min.y, max.y);
        let (z0, z1) = span(center.z, min.z, max.z);
        let squared = |v: i64, c: i32| {
            let d = (v - i64::from(c)) as f64;
            d * d
        };

        let mut cleared = 0;
        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    if squared(x, center.x) + squared(y, center.y) + squared(z, center.z) > r2 {
                        continue;
                    }
                    let (x, y, z) = (x as i32, y as i32, z as i32);
                    let was_occupied = self.read_voxel(x, y, z).is_occupied();
                    if self.write_voxel(x, y, z, BlockType::AIR) && was_occupied {
                        cleared += 1;
                    }
                }
            }
        }

        self.counters.voxels_cleared += cleared as u64;
        cleared
    }

    /// Smallest and largest world voxel coordinates covered by resident chunks.
    fn resident_extent(&self) -> Option<(Point3<i64>, Point3<i64>)> {
        let size = self.chunk_size() as i64;
        let mut keys = self.chunks.keys();
        let first = keys.next()?;
        let (mut lo, mut hi) = (*first, *first);
        for key in keys {
            lo = ChunkKey::new(lo.x.min(key.x), lo.y.min(key.y), lo.z.min(key.z));
            hi = ChunkKey::new(hi.x.max(key.x), hi.y.max(key.y), hi.z.max(key.z));
        }
        let start = |k: i32| i64::from(k) * size;
        let end = |k: i32| (i64::from(k) + 1) * size - 1;
        Some((
            Point3::new(start(lo.x), start(lo.y), start(lo.z)),
            Point3::new(end(hi.x), end(hi.y), end(hi.z)),
        ))
    }

    fn submit_sphere_edit(&mut self, center: Point3<i32>, radius: f32) -> SphereEditOutcome {
        let size = self.chunk_size();
        let reach = ((radius / size as f32).ceil() as i64).saturating_add(1);
        let center_key = ChunkKey::from_voxel(center, size);

        let mut targets: Vec<EditTarget> = self
            .chunks
            .iter()
            .filter(|(key, _)| i64::from(key.chebyshev_distance(center_key)) <= reach)
            .map(|(&key, chunk)| EditTarget {
                key,
                version: chunk.version(),
                blocks: chunk.to_buffer(),
            })
            .collect();
        targets.sort_by_key(|target| target.key);

        let chunks = targets.len();
        if chunks > 0 {
            debug!(
                "Submitting sphere edit at {:?} r={} over {} chunks",
                center, radius, chunks
            );
            self.executor
                .submit(Box::new(SphereEditTask::new(center, radius, size, targets)));
        }
        SphereEditOutcome::Submitted { chunks }
    }

    /// Applies the carved snapshots of a sphere edit.
    ///
    /// A chunk still at the snapshot's version takes the carved buffer as is.
    /// A chunk that changed since is carved again in place. Chunks unloaded
    /// since are skipped.
    pub(crate) fn complete_sphere_edit(
        &mut self,
        center: Point3<i32>,
        radius: f32,
        edited: Vec<EditedChunk>,
    ) {
        let mut total = 0;
        for snapshot in edited {
            let key = snapshot.key;
            let Some(chunk) = self.chunks.get_mut(&key) else {
                self.counters.discarded_results += 1;
                continue;
            };

            let cleared = if chunk.version() == snapshot.base_version {
                if snapshot.cleared == 0 {
                    continue;
                }
                if let Err(err) = chunk.replace_blocks(snapshot.blocks) {
                    warn!("Dropping sphere edit of {:?}: {}", key, err);
                    continue;
                }
                snapshot.cleared
            } else {
                carve_sphere(chunk, center, radius)
            };

            if cleared > 0 {
                total += cleared;
                self.mark_chunk_dirty(key);
                self.refresh_bounds(key);
            }
        }

        self.counters.voxels_cleared += total as u64;
        debug!("Sphere edit at {:?} cleared {} voxels", center, total);
    }

    /// Walks the ray in fixed steps of `ray_step` and returns the first sample
    /// that lands in an occupied voxel.
    ///
    /// The walk can step over thin features or clip a voxel corner between
    /// two samples; the reported distance is accurate to one step. The normal
    /// is the dominant axis of the last step, reversed.
    pub fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RayHit> {
        let length = direction.magnitude();
        if !length.is_finite()
            || length <= f32::EPSILON
            || !max_distance.is_finite()
            || max_distance <= 0.0
        {
            return None;
        }
        let direction = direction / length;
        let step = self.config.ray_step;
        let steps = (max_distance / step).floor() as usize;

        let mut previous = origin;
        for i in 0..steps {
            let distance = i as f32 * step;
            let sample = origin + direction * distance;
            let voxel = Point3::new(
                sample.x.floor() as i32,
                sample.y.floor() as i32,
                sample.z.floor() as i32,
            );

            let block = self.read_voxel(voxel.x, voxel.y, voxel.z);
            if block.is_occupied() {
                let delta = if i == 0 { direction } else { sample - previous };
                return Some(RayHit {
                    voxel,
                    block,
                    distance,
                    normal: entry_normal(delta),
                });
            }
            previous = sample;
        }
        None
    }
}

fn entry_normal(delta: Vector3<f32>) -> Vector3<f32> {
    let abs = [delta.x.abs(), delta.y.abs(), delta.z.abs()];
    if abs[0] >= abs[1] && abs[0] >= abs[2] {
        Vector3::new(-delta.x.signum(), 0.0, 0.0)
    } else if abs[1] >= abs[2] {
        Vector3::new(0.0, -delta.y.signum(), 0.0)
    } else {
        Vector3::new(0.0, 0.0, -delta.z.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_normal_opposes_the_dominant_axis() {
        assert_eq!(entry_normal(Vector3::new(0.0, 0.0, -0.1)), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(entry_normal(Vector3::new(0.3, -0.1, 0.2)), Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(entry_normal(Vector3::new(0.0, -0.5, 0.2)), Vector3::new(0.0, 1.0, 0.0));
    }
}
