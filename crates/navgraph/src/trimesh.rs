//! Triangle meshes used as input for [`NavMeshGraphBuilder`](crate::NavMeshGraphBuilder).

use std::ops::Mul;

use glam::{Affine3A, UVec3, Vec3};
use thiserror::Error;

use crate::math::{Aabb3d, TriangleIndices as _};

/// A mesh in local space.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TriMesh {
    /// The vertices composing the mesh.
    /// Follows the convention of a triangle list.
    pub vertices: Vec<Vec3>,

    /// The indices composing the mesh, one entry per triangle.
    /// Follows the convention of a triangle list.
    pub indices: Vec<UVec3>,
}

impl TriMesh {
    /// Creates a mesh from a vertex list and a flat index buffer with a stride of 3.
    pub fn from_flat_indices(vertices: Vec<Vec3>, indices: &[u32]) -> Result<Self, TriMeshError> {
        if indices.len() % 3 != 0 {
            return Err(TriMeshError::IndexCountNotMultipleOfThree {
                count: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|i| **i as usize >= vertices.len()) {
            return Err(TriMeshError::IndexOutOfBounds {
                index,
                vertex_count: vertices.len(),
            });
        }
        let indices = indices
            .chunks_exact(3)
            .map(|triangle| UVec3::new(triangle[0], triangle[1], triangle[2]))
            .collect();
        Ok(Self { vertices, indices })
    }

    /// Number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Extends the trimesh with the vertices and indices of another trimesh.
    /// The indices of `other` will be offset by the number of vertices in `self`.
    ///
    /// # Panics
    ///
    /// Panics if `self` already holds more than `u32::MAX` vertices.
    pub fn extend(&mut self, other: TriMesh) {
        if self.vertices.len() > u32::MAX as usize {
            panic!("Cannot extend a trimesh with more than 2^32 vertices");
        }
        let next_vertex_index = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices
            .extend(other.indices.iter().map(|i| i + next_vertex_index));
    }

    /// Applies a transform to every vertex of the trimesh.
    pub fn apply_transform(&mut self, transform: Affine3A) {
        self.vertices.iter_mut().for_each(|v| {
            *v = transform.transform_point3(*v);
        });
    }

    /// Computes the AABB of the trimesh.
    /// Returns `None` if the trimesh is empty.
    pub fn compute_aabb(&self) -> Option<Aabb3d> {
        Aabb3d::from_verts(&self.vertices)
    }

    /// The arithmetic mean of the vertices of triangle `triangle`, in the mesh's own space.
    ///
    /// # Panics
    ///
    /// Panics if `triangle` or one of its vertex indices is out of bounds.
    #[inline]
    pub fn median_point(&self, triangle: usize) -> Vec3 {
        self.indices[triangle].median_point(&self.vertices)
    }

    /// Iterates over the median points of all triangles, in triangle order.
    pub fn median_points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.indices
            .iter()
            .map(|triangle| triangle.median_point(&self.vertices))
    }
}

impl Mul<TriMesh> for Affine3A {
    type Output = TriMesh;

    fn mul(self, mut trimesh: TriMesh) -> Self::Output {
        trimesh.apply_transform(self);
        trimesh
    }
}

/// Errors that can occur when creating a [`TriMesh`] with [`TriMesh::from_flat_indices`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriMeshError {
    /// Happens when the index buffer does not describe whole triangles.
    #[error("Index count must be a multiple of 3, but got {count}")]
    IndexCountNotMultipleOfThree {
        /// The length of the index buffer
        count: usize,
    },
    /// Happens when an index points past the end of the vertex list.
    #[error("Vertex index {index} is out of bounds for a mesh with {vertex_count} vertices")]
    IndexOutOfBounds {
        /// The offending index
        index: u32,
        /// The number of vertices in the mesh
        vertex_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TriMesh {
        TriMesh::from_flat_indices(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            &[0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn can_create_trimesh_from_flat_indices() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices[1], UVec3::new(0, 2, 3));
    }

    #[test]
    fn rejects_partial_triangles() {
        let error = TriMesh::from_flat_indices(vec![Vec3::ZERO; 3], &[0, 1]).unwrap_err();
        assert_eq!(
            error,
            TriMeshError::IndexCountNotMultipleOfThree { count: 2 }
        );
    }

    #[test]
    fn rejects_out_of_bounds_indices() {
        let error = TriMesh::from_flat_indices(vec![Vec3::ZERO; 3], &[0, 1, 3]).unwrap_err();
        assert_eq!(
            error,
            TriMeshError::IndexOutOfBounds {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn extend_offsets_indices() {
        let mut mesh = quad();
        mesh.extend(quad());
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.indices[2], UVec3::new(4, 5, 6));
        assert_eq!(mesh.indices[3], UVec3::new(4, 6, 7));
    }

    #[test]
    fn transform_moves_vertices() {
        let mesh = Affine3A::from_translation(Vec3::new(0.0, 2.0, 0.0)) * quad();
        let aabb = mesh.compute_aabb().unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn empty_mesh_has_no_aabb() {
        let mesh = TriMesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.compute_aabb(), None);
    }
}
