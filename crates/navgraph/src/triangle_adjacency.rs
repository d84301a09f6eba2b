//! Finds the triangles of a mesh that share an edge.
//!
//! Two triangles are adjacent when at least two of their vertices sit at identical positions.
//! Positions are compared, not indices, so meshes whose vertices were duplicated per triangle
//! or that were concatenated from several sources still connect. Sharing a single corner does
//! not make two triangles adjacent.

use glam::{UVec3, Vec3};
use rustc_hash::FxHashMap;

use crate::{AdjacencyStrategy, math::position_key};

/// For every triangle of a mesh, the indices of the other triangles it shares an edge with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriangleAdjacency {
    neighbors: Vec<Vec<usize>>,
}

impl TriangleAdjacency {
    /// Computes the adjacency of `triangles`, whose indices point into `vertices`.
    ///
    /// Neighbor lists are sorted by triangle index.
    ///
    /// # Panics
    ///
    /// Panics if a triangle refers to a vertex that is out of bounds.
    pub fn new(triangles: &[UVec3], vertices: &[Vec3], strategy: AdjacencyStrategy) -> Self {
        match strategy {
            AdjacencyStrategy::Exhaustive => Self::exhaustive(triangles, vertices),
            AdjacencyStrategy::SpatialHash => Self::spatial_hash(triangles, vertices),
        }
    }

    /// Compares every triangle against every other triangle.
    pub fn exhaustive(triangles: &[UVec3], vertices: &[Vec3]) -> Self {
        let neighbors = triangles
            .iter()
            .enumerate()
            .map(|(i, triangle)| {
                triangles
                    .iter()
                    .enumerate()
                    .filter(|&(j, &other)| j != i && are_adjacent(*triangle, other, vertices))
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect();
        Self { neighbors }
    }

    /// Buckets triangles by vertex position and only compares triangles that share a bucket.
    ///
    /// Accumulates exactly the pair count [`shared_vertex_count`] computes, so the result is
    /// identical to [`Self::exhaustive`].
    pub fn spatial_hash(triangles: &[UVec3], vertices: &[Vec3]) -> Self {
        // Position -> (triangle, how many of its vertices sit at that position).
        let mut buckets: FxHashMap<[u32; 3], Vec<(usize, u32)>> = FxHashMap::default();
        for (i, triangle) in triangles.iter().enumerate() {
            let keys = triangle_keys(*triangle, vertices);
            for (k, key) in keys.iter().enumerate() {
                let Some(key) = key else {
                    continue;
                };
                if keys[..k].contains(&Some(*key)) {
                    // Already counted with its multiplicity.
                    continue;
                }
                let multiplicity = keys.iter().filter(|other| **other == Some(*key)).count();
                buckets
                    .entry(*key)
                    .or_default()
                    .push((i, multiplicity as u32));
            }
        }

        let mut counts: FxHashMap<usize, u32> = FxHashMap::default();
        let neighbors = triangles
            .iter()
            .enumerate()
            .map(|(i, triangle)| {
                counts.clear();
                for key in triangle_keys(*triangle, vertices).into_iter().flatten() {
                    for &(other, multiplicity) in &buckets[&key] {
                        if other != i {
                            *counts.entry(other).or_default() += multiplicity;
                        }
                    }
                }
                let mut neighbors: Vec<usize> = counts
                    .iter()
                    .filter(|(_, count)| **count > 1)
                    .map(|(other, _)| *other)
                    .collect();
                neighbors.sort_unstable();
                neighbors
            })
            .collect();
        Self { neighbors }
    }

    /// The triangles sharing an edge with `triangle`.
    ///
    /// # Panics
    ///
    /// Panics if `triangle` is out of bounds.
    #[inline]
    pub fn neighbors(&self, triangle: usize) -> &[usize] {
        &self.neighbors[triangle]
    }

    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns `true` if there are no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Iterates over `(triangle, neighbors)` pairs in triangle order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .map(|(i, neighbors)| (i, neighbors.as_slice()))
    }
}

/// Counts the vertex pairs `(a, b)` with `a` from `triangle` and `b` from `other` that sit at
/// the same position.
///
/// Nine comparisons. Two distinct triangles sharing an edge score 2, sharing all corners scores 3.
#[inline]
pub fn shared_vertex_count(triangle: UVec3, other: UVec3, vertices: &[Vec3]) -> u32 {
    let mut count = 0;
    for a in triangle.to_array() {
        for b in other.to_array() {
            if vertices[a as usize] == vertices[b as usize] {
                count += 1;
            }
        }
    }
    count
}

/// Whether two triangles share at least two vertex positions.
#[inline]
pub fn are_adjacent(triangle: UVec3, other: UVec3, vertices: &[Vec3]) -> bool {
    shared_vertex_count(triangle, other, vertices) > 1
}

#[inline]
fn triangle_keys(triangle: UVec3, vertices: &[Vec3]) -> [Option<[u32; 3]>; 3] {
    triangle
        .to_array()
        .map(|index| position_key(vertices[index as usize]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertices() -> Vec<Vec3> {
        (0..8)
            .map(|i| Vec3::new(i as f32, (i * i) as f32, 0.5 * i as f32))
            .collect()
    }

    fn both(triangles: &[UVec3], vertices: &[Vec3]) -> TriangleAdjacency {
        let exhaustive = TriangleAdjacency::exhaustive(triangles, vertices);
        let hashed = TriangleAdjacency::spatial_hash(triangles, vertices);
        assert_eq!(exhaustive, hashed, "strategies disagree");
        exhaustive
    }

    #[test]
    fn triangles_sharing_two_vertices_are_neighbors() {
        let triangles = [UVec3::new(0, 1, 2), UVec3::new(1, 2, 3)];
        assert!(are_adjacent(triangles[0], triangles[1], &vertices()));
        assert!(are_adjacent(triangles[1], triangles[0], &vertices()));
        let adjacency = both(&triangles, &vertices());
        assert_eq!(adjacency.neighbors(0), &[1]);
        assert_eq!(adjacency.neighbors(1), &[0]);
    }

    #[test]
    fn triangles_sharing_one_vertex_are_not_neighbors() {
        let triangles = [UVec3::new(0, 1, 2), UVec3::new(2, 5, 6)];
        assert!(!are_adjacent(triangles[0], triangles[1], &vertices()));
        assert!(!are_adjacent(triangles[0], UVec3::new(5, 6, 7), &vertices()));
        let adjacency = both(&triangles, &vertices());
        assert!(adjacency.neighbors(0).is_empty());
        assert!(adjacency.neighbors(1).is_empty());
    }

    #[test]
    fn triangles_sharing_three_vertices_are_neighbors() {
        let triangles = [UVec3::new(0, 1, 2), UVec3::new(2, 0, 1)];
        let adjacency = both(&triangles, &vertices());
        assert_eq!(adjacency.neighbors(0), &[1]);
        assert_eq!(adjacency.neighbors(1), &[0]);
    }

    #[test]
    fn triangle_is_never_its_own_neighbor() {
        let triangles = [UVec3::new(0, 1, 2)];
        let adjacency = both(&triangles, &vertices());
        assert!(adjacency.neighbors(0).is_empty());
    }

    #[test]
    fn adjacency_compares_positions_not_indices() {
        let mut vertices = vertices();
        // Vertex 6 and 7 duplicate the positions of 1 and 2.
        vertices[6] = vertices[1];
        vertices[7] = vertices[2];
        let triangles = [UVec3::new(0, 1, 2), UVec3::new(6, 7, 5)];
        let adjacency = both(&triangles, &vertices);
        assert_eq!(adjacency.neighbors(0), &[1]);
    }

    #[test]
    fn negative_zero_matches_positive_zero() {
        let vertices = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-0.0, 0.0, -0.0),
            Vec3::new(1.0, -0.0, 0.0),
            Vec3::new(1.0, 0.0, -1.0),
        ];
        let triangles = [UVec3::new(0, 1, 2), UVec3::new(3, 4, 5)];
        let adjacency = both(&triangles, &vertices);
        assert_eq!(adjacency.neighbors(0), &[1]);
    }

    #[test]
    fn degenerate_triangle_counts_every_matching_pair() {
        // Triangle 1 has two corners at the position of vertex 0, so one shared point scores 2.
        let mut vertices = vertices();
        vertices[4] = vertices[0];
        let triangles = [UVec3::new(0, 1, 2), UVec3::new(0, 4, 5)];
        assert_eq!(
            shared_vertex_count(triangles[0], triangles[1], &vertices),
            2
        );
        assert!(are_adjacent(triangles[0], triangles[1], &vertices));
        let adjacency = both(&triangles, &vertices);
        assert_eq!(adjacency.neighbors(0), &[1]);
    }

    #[test]
    fn strip_has_chain_adjacency() {
        let triangles = [
            UVec3::new(0, 1, 2),
            UVec3::new(1, 2, 3),
            UVec3::new(2, 3, 4),
            UVec3::new(3, 4, 5),
        ];
        let adjacency = both(&triangles, &vertices());
        assert_eq!(adjacency.neighbors(0), &[1]);
        assert_eq!(adjacency.neighbors(1), &[0, 2]);
        assert_eq!(adjacency.neighbors(2), &[1, 3]);
        assert_eq!(adjacency.neighbors(3), &[2]);
        assert_eq!(adjacency.len(), 4);
    }

    #[test]
    fn empty_mesh_has_no_adjacency() {
        let adjacency = both(&[], &[]);
        assert!(adjacency.is_empty());
    }
}
