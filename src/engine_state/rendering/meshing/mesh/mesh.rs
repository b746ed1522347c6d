//! Mesh data structures for voxel rendering.
//!
//! [`MeshData`] is the mesher's output: chunk-local geometry in separate
//! position, normal, colour and index streams. It is plain data so it can be
//! built on a worker and moved back to the driving thread.

use crate::engine_state::rendering::Vertex;

use super::face::Face;

/// Triangle geometry for one chunk, in chunk-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex outward normals
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex shaded RGBA colours
    pub colors: Vec<[f32; 4]>,
    /// Triangle list into the vertex streams
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of quads emitted.
    pub fn face_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// `true` if the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends one quad: four vertices and two triangles.
    ///
    /// The index base is the current vertex count, so it advances by four per face.
    pub fn push_face(&mut self, face: &Face) {
        let base = self.positions.len() as u32;
        let normal = face.block_side.normal();
        let color = face.color();

        for corner in face.corners {
            self.positions
                .push([corner.x as f32, corner.y as f32, corner.z as f32]);
            self.normals.push(normal);
            self.colors.push(color);
        }
        self.indices.extend_from_slice(&Face::indices(base));
    }

    /// Interleaves the streams into GPU upload order.
    pub fn to_vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.colors)
            .map(|((&position, &normal), &color)| Vertex::new(position, normal, color))
            .collect()
    }
}
