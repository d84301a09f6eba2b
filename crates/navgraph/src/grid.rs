//! Samples walkable surfaces with downward raycasts over a horizontal grid.

use glam::{IVec3, UVec3, Vec3};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    AdjacencyStrategy, Graph, GridGraphConfig, MapType, Node, NodeId, SpatialQuery,
    math::{dir_offset_x, dir_offset_z},
    spatial_query::Ray,
};

/// How many times a column ray continues below its previous hit.
const MAX_CONTINUATIONS: usize = 10;
/// How far below a hit the next ray of the same column starts. `[Units: wu]`
const CONTINUATION_OFFSET: f32 = 1.0;

/// Builds a [`MapType::Grid`] graph from a [`GridGraphConfig`] and a scene to cast rays into.
///
/// Every column is sampled from the top down. The first surface hit is always kept. Surfaces
/// further down are only kept while nothing sits within half a spacing beside or above them,
/// which filters out the insides of walls and floors with too little headroom.
#[derive(Debug, Clone, Default)]
pub struct GridGraphBuilder {
    config: GridGraphConfig,
}

impl GridGraphBuilder {
    /// Creates a builder for `config`.
    pub fn new(config: GridGraphConfig) -> Self {
        Self { config }
    }

    /// The config this builder samples with.
    pub fn config(&self) -> &GridGraphConfig {
        &self.config
    }

    /// Casts every column against `query` and links the resulting nodes.
    ///
    /// Nodes are ordered by column, x outer and z inner, then top to bottom within a column.
    pub fn build(&self, query: &impl SpatialQuery) -> Result<Graph, GridGraphError> {
        let config = &self.config;
        if !config.spacing.is_finite() || config.spacing <= 0.0 {
            return Err(GridGraphError::InvalidSpacing {
                spacing: config.spacing,
            });
        }
        let columns = (config.size.x as usize)
            .checked_mul(config.size.z as usize)
            .ok_or(GridGraphError::ColumnCountTooLarge { size: config.size })?;
        if columns == 0 {
            tracing::warn!(
                "Grid size {:?} has no columns. The graph stays empty.",
                config.size
            );
        }

        let height = config.cast_height();
        let mut positions = Vec::new();
        for x in 0..config.size.x {
            for z in 0..config.size.z {
                let origin = Vec3::new(
                    config.origin.x + x as f32 * config.spacing,
                    height,
                    config.origin.z + z as f32 * config.spacing,
                );
                positions.extend(self.raycast_continuous(query, origin));
            }
        }

        let mut nodes: Vec<Node> = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| Node::new(NodeId::from_index(i), position))
            .collect();
        let threshold = config.link_threshold();
        match config.adjacency {
            AdjacencyStrategy::Exhaustive => link_exhaustive(&mut nodes, threshold),
            AdjacencyStrategy::SpatialHash => link_spatial_hash(&mut nodes, threshold),
        }

        let graph = Graph::from_built_nodes(MapType::Grid, nodes, config.spacing);
        tracing::debug!(
            columns,
            nodes = graph.len(),
            links = graph.link_count(),
            "Built grid graph"
        );
        Ok(graph)
    }

    /// All accepted surface points of the column whose ray starts at `origin`, top to bottom.
    fn raycast_continuous(&self, query: &impl SpatialQuery, origin: Vec3) -> Vec<Vec3> {
        let layers = self.config.layers;
        let cast_down =
            |start: Vec3| query.cast(Ray::new(start, Vec3::NEG_Y), f32::INFINITY, layers);

        let Some(first) = cast_down(origin) else {
            return Vec::new();
        };
        let mut points = vec![first.point];
        let mut previous = first.point;
        for _ in 0..MAX_CONTINUATIONS {
            let Some(hit) = cast_down(previous - Vec3::Y * CONTINUATION_OFFSET) else {
                break;
            };
            if self.is_enclosed(query, hit.point) {
                tracing::trace!(point = ?hit.point, "Rejected enclosed grid hit");
                break;
            }
            points.push(hit.point);
            previous = hit.point;
        }
        points
    }

    /// Returns `true` if any enclosure ray from `point` to the sides or straight up hits something.
    fn is_enclosed(&self, query: &impl SpatialQuery, point: Vec3) -> bool {
        let length = self.config.enclosure_ray_length();
        let layers = self.config.layers;
        let hits = |direction: Vec3| query.cast(Ray::new(point, direction), length, layers);
        (0..4)
            .map(|dir| Vec3::new(dir_offset_x(dir), 0.0, dir_offset_z(dir)))
            .chain(std::iter::once(Vec3::Y))
            .any(|direction| hits(direction).is_some())
    }
}

#[inline]
fn within(a: Vec3, b: Vec3, threshold: f32) -> bool {
    a.distance_squared(b) <= threshold
}

fn link_exhaustive(nodes: &mut [Node], threshold: f32) {
    let positions: Vec<Vec3> = nodes.iter().map(Node::position).collect();
    for (i, node) in nodes.iter_mut().enumerate() {
        let neighbors = positions
            .iter()
            .enumerate()
            .filter(|&(j, &other)| j != i && within(positions[i], other, threshold))
            .map(|(j, _)| NodeId::from_index(j))
            .collect();
        node.set_neighbors(neighbors);
    }
}

/// Same links as [`link_exhaustive`], only comparing nodes in the same or touching buckets.
fn link_spatial_hash(nodes: &mut [Node], threshold: f32) {
    // Buckets are wider than the link radius, so linked nodes are at most one bucket apart.
    let cell_size = threshold.sqrt() * 1.25;
    if !cell_size.is_normal() {
        link_exhaustive(nodes, threshold);
        return;
    }
    let cell = |position: Vec3| (position / cell_size).floor().as_ivec3();

    let mut buckets: FxHashMap<IVec3, Vec<NodeId>> = FxHashMap::default();
    for node in nodes.iter() {
        buckets.entry(cell(node.position())).or_default().push(node.id());
    }

    let positions: Vec<Vec3> = nodes.iter().map(Node::position).collect();
    for (i, node) in nodes.iter_mut().enumerate() {
        let position = positions[i];
        let center = cell(position);
        let mut neighbors = Vec::new();
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let key = center.wrapping_add(IVec3::new(dx, dy, dz));
                    let Some(bucket) = buckets.get(&key) else {
                        continue;
                    };
                    neighbors.extend(bucket.iter().copied().filter(|other| {
                        other.index() != i && within(position, positions[other.index()], threshold)
                    }));
                }
            }
        }
        neighbors.sort_unstable();
        node.set_neighbors(neighbors);
    }
}

/// Errors that can occur when building a [`MapType::Grid`] graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridGraphError {
    /// Happens when the spacing is zero, negative or not finite.
    #[error("Grid spacing must be finite and greater than zero, but was {spacing}")]
    InvalidSpacing {
        /// The rejected spacing
        spacing: f32,
    },
    /// Happens when the number of columns does not fit into `usize`.
    #[error("Grid of size {size:?} has more columns than can be addressed")]
    ColumnCountTooLarge {
        /// The configured size
        size: UVec3,
    },
}
