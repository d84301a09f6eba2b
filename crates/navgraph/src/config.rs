use glam::{UVec3, Vec3};

use crate::LayerMask;

/// Which builder produced a [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MapType {
    /// Built by [`GridGraphBuilder`](crate::GridGraphBuilder) from raycasts over a horizontal grid.
    Grid,
    /// Built by [`WaypointGraphBuilder`](crate::WaypointGraphBuilder) from hand-placed markers.
    Waypoint,
    /// Built by [`NavMeshGraphBuilder`](crate::NavMeshGraphBuilder) from triangle meshes.
    NavMesh,
}

impl MapType {
    /// Whether graphs of this type are guaranteed to have a symmetric neighbor relation.
    ///
    /// Waypoint graphs keep whatever links the markers declared, one-way links included.
    pub fn is_symmetric(self) -> bool {
        match self {
            MapType::Grid | MapType::NavMesh => true,
            MapType::Waypoint => false,
        }
    }
}

/// How builders discover which nodes are adjacent.
///
/// Both strategies produce identical graphs. [`AdjacencyStrategy::Exhaustive`] compares every pair
/// and is quadratic in the number of nodes; [`AdjacencyStrategy::SpatialHash`] only compares
/// candidates that share a hash bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum AdjacencyStrategy {
    /// Compare every pair of candidates.
    Exhaustive,
    /// Only compare candidates that land in the same or neighboring buckets.
    #[default]
    SpatialHash,
}

/// Parameters of a [`GridGraphBuilder`](crate::GridGraphBuilder) build.
///
/// The grid covers `size.x * size.z` columns, `spacing` world units apart, starting at `origin`.
/// Every column is sampled by a ray cast straight down from `origin.y + size.y * spacing`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGraphConfig {
    /// World position of the cell `(0, 0)`. `[Units: wu]`
    pub origin: Vec3,

    /// Number of columns along x and z. `y` scales the height the rays start from. `[Units: cells]`
    pub size: UVec3,

    /// Distance between two neighboring columns. `[Limit: > 0] [Units: wu]`
    ///
    /// Also drives the enclosure rays (half a spacing long) and the link radius:
    /// two nodes are linked when their squared distance is at most `spacing * 2.1`.
    pub spacing: f32,

    /// The collision layers the rays are cast against.
    pub layers: LayerMask,

    /// How nodes find their neighbors after sampling.
    pub adjacency: AdjacencyStrategy,
}

impl Default for GridGraphConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            size: UVec3::new(10, 10, 10),
            spacing: 1.0,
            layers: LayerMask::DEFAULT,
            adjacency: AdjacencyStrategy::default(),
        }
    }
}

impl GridGraphConfig {
    /// Sets [`Self::origin`].
    pub fn with_origin(mut self, origin: impl Into<Vec3>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets [`Self::size`].
    pub fn with_size(mut self, size: impl Into<UVec3>) -> Self {
        self.size = size.into();
        self
    }

    /// Sets [`Self::spacing`].
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets [`Self::layers`].
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Sets [`Self::adjacency`].
    pub fn with_adjacency(mut self, adjacency: AdjacencyStrategy) -> Self {
        self.adjacency = adjacency;
        self
    }

    /// The height every column ray starts from.
    #[inline]
    pub fn cast_height(&self) -> f32 {
        self.origin.y + self.size.y as f32 * self.spacing
    }

    /// The squared-distance threshold under which two grid nodes are linked.
    ///
    /// This compares a squared distance against a non-squared length on purpose; the loose radius
    /// also picks up diagonal and stacked neighbors.
    #[inline]
    pub fn link_threshold(&self) -> f32 {
        self.spacing * 2.1
    }

    /// Length of the five enclosure rays cast from stacked hits.
    #[inline]
    pub fn enclosure_ray_length(&self) -> f32 {
        self.spacing / 2.0
    }
}
