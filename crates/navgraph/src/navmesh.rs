//! Builds a [`Graph`] from navigation meshes: one node per triangle, linked to the nodes of
//! every triangle it shares an edge with.

use glam::{Affine3A, Vec3};

use crate::{
    AdjacencyStrategy, Graph, MapType, Node, NodeId, TriMesh, TriangleAdjacency,
    node::make_neighbors,
};

/// A navigation mesh in local space and the transform placing it in the world.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NavMeshSource {
    /// The mesh, in local space.
    pub mesh: TriMesh,
    /// Maps local points of [`Self::mesh`] to world points.
    pub transform: Affine3A,
}

impl NavMeshSource {
    /// Creates a source placed with `transform`.
    pub fn new(mesh: TriMesh, transform: Affine3A) -> Self {
        Self { mesh, transform }
    }

    /// The world-space median point of every triangle, in triangle order.
    ///
    /// The median is averaged in local space and then transformed.
    pub fn median_points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.mesh
            .median_points()
            .map(|median| self.transform.transform_point3(median))
    }

    /// The mesh with every vertex moved to world space.
    pub fn world_mesh(&self) -> TriMesh {
        self.transform * self.mesh.clone()
    }
}

impl From<TriMesh> for NavMeshSource {
    fn from(mesh: TriMesh) -> Self {
        Self::new(mesh, Affine3A::IDENTITY)
    }
}

/// Builds the dual graph of one or more navigation meshes.
///
/// Every triangle becomes a node at its median point. Nodes are linked when their triangles
/// share at least two vertex positions in world space. Meshes are merged before adjacency is
/// computed, so separate meshes whose edges coincide in the world end up connected.
#[derive(Debug, Clone, Default)]
pub struct NavMeshGraphBuilder {
    /// The meshes to build from. Node ids follow this order, then triangle order.
    pub meshes: Vec<NavMeshSource>,
    /// How shared edges are found.
    pub adjacency: AdjacencyStrategy,
}

impl NavMeshGraphBuilder {
    /// Creates a builder for a single mesh.
    pub fn new(mesh: impl Into<NavMeshSource>) -> Self {
        Self {
            meshes: vec![mesh.into()],
            adjacency: AdjacencyStrategy::default(),
        }
    }

    /// Creates a builder merging several meshes.
    pub fn from_meshes(meshes: impl IntoIterator<Item = NavMeshSource>) -> Self {
        Self {
            meshes: meshes.into_iter().collect(),
            adjacency: AdjacencyStrategy::default(),
        }
    }

    /// Sets [`Self::adjacency`].
    pub fn with_adjacency(mut self, adjacency: AdjacencyStrategy) -> Self {
        self.adjacency = adjacency;
        self
    }

    /// Builds the graph.
    ///
    /// Without any mesh this logs a warning and returns an empty graph. Empty meshes contribute
    /// no nodes.
    pub fn build(self) -> Graph {
        let (world_mesh, medians) = match self.meshes.as_slice() {
            [] => {
                tracing::warn!("No navigation mesh to build a graph from. The graph stays empty.");
                return Graph::empty(MapType::NavMesh);
            }
            [single] => (single.world_mesh(), single.median_points().collect()),
            meshes => merge(meshes),
        };

        let mut nodes: Vec<Node> = medians
            .into_iter()
            .enumerate()
            .map(|(i, median)| Node::new(NodeId::from_index(i), median))
            .collect();

        let adjacency =
            TriangleAdjacency::new(&world_mesh.indices, &world_mesh.vertices, self.adjacency);
        for (triangle, neighbors) in adjacency.iter() {
            for &neighbor in neighbors {
                make_neighbors(
                    &mut nodes,
                    NodeId::from_index(triangle),
                    NodeId::from_index(neighbor),
                );
            }
        }

        let graph = Graph::from_built_nodes(MapType::NavMesh, nodes, mean_edge_length(&world_mesh));
        tracing::debug!(
            meshes = self.meshes.len(),
            nodes = graph.len(),
            links = graph.link_count(),
            "Built navmesh graph"
        );
        graph
    }
}

/// Concatenates all meshes in world space and collects their medians in the same order.
fn merge(meshes: &[NavMeshSource]) -> (TriMesh, Vec<Vec3>) {
    let mut combined = TriMesh::default();
    let mut medians = Vec::with_capacity(meshes.iter().map(|m| m.mesh.triangle_count()).sum());
    for source in meshes {
        medians.extend(source.median_points());
        combined.extend(source.world_mesh());
    }
    (combined, medians)
}

/// Average length of a triangle edge, used to size the position index buckets.
fn mean_edge_length(mesh: &TriMesh) -> f32 {
    if mesh.is_empty() {
        return 1.0;
    }
    let total: f32 = mesh
        .indices
        .iter()
        .map(|triangle| {
            let [a, b, c] = triangle.to_array().map(|i| mesh.vertices[i as usize]);
            a.distance(b) + b.distance(c) + c.distance(a)
        })
        .sum();
    total / (mesh.triangle_count() * 3) as f32
}
