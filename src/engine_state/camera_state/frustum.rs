//! # View Frustum
//!
//! Six clip planes extracted from a combined view-projection matrix, used to
//! cull chunk bounding boxes before drawing.
//!
//! Each plane is `(nx, ny, nz, d)` with `nx*x + ny*y + nz*z + d >= 0` meaning
//! inside. The near plane is taken as `row3 + row2`, which is exact for an
//! OpenGL-style `-w..w` depth range and slightly loose for WGPU's `0..w`; it
//! never rejects a box that is actually visible.

use cgmath::{Matrix4, Point3, Vector4};

use crate::engine_state::spatial::Aabb;

/// Six inward-facing clip planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far
    pub planes: [Vector4<f32>; 6],
}

impl Frustum {
    /// Extracts the planes of `view_projection`.
    ///
    /// `cgmath` matrices are column-major, so row `i` is
    /// `(m.x[i], m.y[i], m.z[i], m.w[i])`.
    pub fn from_matrix(view_projection: &Matrix4<f32>) -> Self {
        let m = view_projection;
        let row = |i: usize| Vector4::new(m.x[i], m.y[i], m.z[i], m.w[i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                r3 + r0, // left
                r3 - r0, // right
                r3 + r1, // bottom
                r3 - r1, // top
                r3 + r2, // near
                r3 - r2, // far
            ],
        }
    }

    /// `true` unless `bounds` lies entirely outside one plane.
    ///
    /// Tests the box corner furthest along each plane normal, so it may keep a
    /// box near a frustum corner that is actually outside.
    pub fn intersects_aabb(&self, bounds: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let px = if plane.x >= 0.0 { bounds.max.x } else { bounds.min.x };
            let py = if plane.y >= 0.0 { bounds.max.y } else { bounds.min.y };
            let pz = if plane.z >= 0.0 { bounds.max.z } else { bounds.min.z };
            plane.x * px + plane.y * py + plane.z * pz + plane.w >= 0.0
        })
    }

    /// `true` if `point` is inside every plane.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.x * point.x + plane.y * point.y + plane.z * point.z + plane.w >= 0.0)
    }
}
