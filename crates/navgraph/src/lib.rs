#![doc = include_str!("../../../readme.md")]

mod config;
mod graph;
mod grid;
pub(crate) mod math;
mod navmesh;
mod node;
mod position_index;
mod search_state;
mod spatial_query;
mod triangle_adjacency;
mod trimesh;
mod waypoint;

pub use config::{AdjacencyStrategy, GridGraphConfig, MapType};
pub use graph::{Graph, GraphError};
pub use grid::{GridGraphBuilder, GridGraphError};
pub use math::Aabb3d;
pub use navmesh::{NavMeshGraphBuilder, NavMeshSource};
pub use node::{Node, NodeId};
pub use search_state::SearchState;
pub use spatial_query::{AabbScene, LayerMask, Ray, RayHit, SpatialQuery};
pub use triangle_adjacency::{TriangleAdjacency, are_adjacent, shared_vertex_count};
pub use trimesh::{TriMesh, TriMeshError};
pub use waypoint::{
    RadiusWaypoint, Waypoint, WaypointGraphBuilder, WaypointKey, WaypointMarker, WaypointSet,
};

/// Everything needed to build and query graphs.
pub mod prelude {
    pub use crate::{
        AdjacencyStrategy, Graph, GridGraphBuilder, GridGraphConfig, LayerMask, MapType,
        NavMeshGraphBuilder, NavMeshSource, Node, NodeId, SearchState, SpatialQuery, TriMesh,
        WaypointGraphBuilder, WaypointMarker, WaypointSet,
    };
}
