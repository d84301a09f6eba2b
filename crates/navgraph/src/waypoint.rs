//! Graphs from hand-placed markers that decide their own neighbors.

use std::ops::{Index, IndexMut};

use glam::Vec3;
use slotmap::{SecondaryMap, SlotMap};

use crate::{Graph, MapType, Node, NodeId};

slotmap::new_key_type! {
    /// Identifies a marker inside a [`WaypointSet`].
    pub struct WaypointKey;
}

/// A hand-placed marker that becomes one node of a [`MapType::Waypoint`] graph.
///
/// The marker alone decides which other markers it links to. Links may be one-way.
pub trait WaypointMarker: Sized {
    /// World position of the marker.
    fn position(&self) -> Vec3;

    /// The markers reachable from this one, which is stored under `key` in `all`.
    fn find_neighbors(&self, key: WaypointKey, all: &WaypointSet<Self>) -> Vec<WaypointKey>;
}

/// A marker with an explicit list of neighbors.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// World position of the marker.
    pub position: Vec3,
    /// The markers this one links to.
    pub neighbors: Vec<WaypointKey>,
}

impl Waypoint {
    /// Creates a marker without neighbors.
    pub fn new(position: impl Into<Vec3>) -> Self {
        Self {
            position: position.into(),
            neighbors: Vec::new(),
        }
    }

    /// Adds a one-way link to `neighbor`.
    pub fn with_neighbor(mut self, neighbor: WaypointKey) -> Self {
        self.neighbors.push(neighbor);
        self
    }
}

impl WaypointMarker for Waypoint {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn find_neighbors(&self, _key: WaypointKey, _all: &WaypointSet<Self>) -> Vec<WaypointKey> {
        self.neighbors.clone()
    }
}

/// A marker that links to every other marker within `radius`.
///
/// Markers with different radii can produce one-way links.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RadiusWaypoint {
    /// World position of the marker.
    pub position: Vec3,
    /// How far this marker sees. `[Units: wu]`
    pub radius: f32,
}

impl RadiusWaypoint {
    /// Creates a marker seeing `radius` units around `position`.
    pub fn new(position: impl Into<Vec3>, radius: f32) -> Self {
        Self {
            position: position.into(),
            radius,
        }
    }
}

impl WaypointMarker for RadiusWaypoint {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn find_neighbors(&self, key: WaypointKey, all: &WaypointSet<Self>) -> Vec<WaypointKey> {
        let radius_squared = self.radius * self.radius;
        all.iter()
            .filter(|&(other_key, other)| {
                other_key != key && self.position.distance_squared(other.position) <= radius_squared
            })
            .map(|(other_key, _)| other_key)
            .collect()
    }
}

/// The markers a [`MapType::Waypoint`] graph is built from.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct WaypointSet<M> {
    markers: SlotMap<WaypointKey, M>,
}

impl<M> Default for WaypointSet<M> {
    fn default() -> Self {
        Self {
            markers: SlotMap::with_key(),
        }
    }
}

impl<M> WaypointSet<M> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker and returns its key.
    pub fn insert(&mut self, marker: M) -> WaypointKey {
        self.markers.insert(marker)
    }

    /// Adds a marker built from its own key, for markers that need to refer to themselves.
    pub fn insert_with_key(&mut self, f: impl FnOnce(WaypointKey) -> M) -> WaypointKey {
        self.markers.insert_with_key(f)
    }

    /// Removes a marker. Links other markers hold to it are dropped when the graph is built.
    pub fn remove(&mut self, key: WaypointKey) -> Option<M> {
        self.markers.remove(key)
    }

    /// Removes every marker.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Returns the marker stored under `key`.
    pub fn get(&self, key: WaypointKey) -> Option<&M> {
        self.markers.get(key)
    }

    /// Returns the marker stored under `key` mutably.
    pub fn get_mut(&mut self, key: WaypointKey) -> Option<&mut M> {
        self.markers.get_mut(key)
    }

    /// Returns `true` if a marker is stored under `key`.
    pub fn contains_key(&self, key: WaypointKey) -> bool {
        self.markers.contains_key(key)
    }

    /// All markers with their keys. This is also the node order of built graphs.
    pub fn iter(&self) -> impl Iterator<Item = (WaypointKey, &M)> {
        self.markers.iter()
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if the set holds no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl<M: WaypointMarker> WaypointSet<M> {
    /// Builds the graph and consumes the markers.
    pub fn into_graph(self) -> Graph {
        WaypointGraphBuilder::build(&self)
    }
}

impl<M> FromIterator<M> for WaypointSet<M> {
    fn from_iter<T: IntoIterator<Item = M>>(iter: T) -> Self {
        let mut set = Self::new();
        for marker in iter {
            set.insert(marker);
        }
        set
    }
}

impl<M> Index<WaypointKey> for WaypointSet<M> {
    type Output = M;

    fn index(&self, key: WaypointKey) -> &Self::Output {
        &self.markers[key]
    }
}

impl<M> IndexMut<WaypointKey> for WaypointSet<M> {
    fn index_mut(&mut self, key: WaypointKey) -> &mut Self::Output {
        &mut self.markers[key]
    }
}

/// Turns a [`WaypointSet`] into a [`MapType::Waypoint`] graph.
///
/// Every marker becomes a node in set order. Links are taken from
/// [`WaypointMarker::find_neighbors`] as they are, one-way links included.
/// The set is left untouched; drop or [`clear`](WaypointSet::clear) it afterwards, or use
/// [`WaypointSet::into_graph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WaypointGraphBuilder;

impl WaypointGraphBuilder {
    /// Builds the graph.
    ///
    /// Self links and repeated links are dropped. Links to keys that are not in `set` are
    /// dropped with a warning.
    pub fn build<M: WaypointMarker>(set: &WaypointSet<M>) -> Graph {
        let mut ids = SecondaryMap::with_capacity(set.len());
        let mut nodes: Vec<Node> = set
            .iter()
            .enumerate()
            .map(|(i, (key, marker))| {
                let id = NodeId::from_index(i);
                ids.insert(key, id);
                Node::new(id, marker.position())
            })
            .collect();

        for (key, marker) in set.iter() {
            let node = &mut nodes[ids[key].index()];
            for neighbor in marker.find_neighbors(key, set) {
                let Some(&neighbor_id) = ids.get(neighbor) else {
                    tracing::warn!(
                        "Waypoint {key:?} links to {neighbor:?}, which is not part of the set. Dropping the link."
                    );
                    continue;
                };
                node.add_neighbor(neighbor_id);
            }
        }

        let graph = Graph::from_built_nodes(MapType::Waypoint, nodes, 1.0);
        tracing::debug!(
            nodes = graph.len(),
            links = graph.link_count(),
            "Built waypoint graph"
        );
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_links_are_kept_one_way() {
        let mut set = WaypointSet::new();
        let a = set.insert(Waypoint::new([0.0, 0.0, 0.0]));
        let b = set.insert(Waypoint::new([4.0, 0.0, 0.0]));
        set[a].neighbors.push(b);

        let graph = WaypointGraphBuilder::build(&set);
        assert_eq!(graph.map_type(), MapType::Waypoint);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.neighbors(NodeId(0)), &[NodeId(1)]);
        assert!(graph.neighbors(NodeId(1)).is_empty());
        assert!(graph.validate().is_ok());
        // The set survives the build.
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn self_duplicate_and_unknown_links_are_dropped() {
        let mut set = WaypointSet::new();
        let a = set.insert(Waypoint::new([0.0, 0.0, 0.0]));
        let b = set.insert(Waypoint::new([1.0, 0.0, 0.0]));
        let gone = set.insert(Waypoint::new([2.0, 0.0, 0.0]));
        set[a].neighbors = vec![a, b, gone, b];
        set.remove(gone);

        let graph = set.into_graph();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.neighbors(NodeId(0)), &[NodeId(1)]);
    }

    #[test]
    fn radius_markers_link_what_they_see() {
        let set: WaypointSet<_> = [
            RadiusWaypoint::new([0.0, 0.0, 0.0], 1.5),
            RadiusWaypoint::new([1.0, 0.0, 0.0], 1.5),
            RadiusWaypoint::new([3.0, 0.0, 0.0], 2.0),
        ]
        .into_iter()
        .collect();

        let graph = set.into_graph();
        assert_eq!(graph.neighbors(NodeId(0)), &[NodeId(1)]);
        assert_eq!(graph.neighbors(NodeId(1)), &[NodeId(0)]);
        // Only the far marker sees far enough to reach the middle one.
        assert_eq!(graph.neighbors(NodeId(2)), &[NodeId(1)]);
        assert!(!graph.is_connected());
    }

    #[test]
    fn nodes_sit_at_marker_positions() {
        let set: WaypointSet<_> = [Waypoint::new([1.0, 2.0, 3.0]), Waypoint::new([-1.0, 0.0, 5.0])]
            .into_iter()
            .collect();
        let graph = WaypointGraphBuilder::build(&set);
        assert_eq!(
            graph.node_at(Vec3::new(-1.0, 0.0, 5.0)).map(Node::id),
            Some(NodeId(1))
        );
    }

    #[test]
    fn empty_set_builds_an_empty_graph() {
        let graph = WaypointSet::<Waypoint>::new().into_graph();
        assert!(graph.is_empty());
        assert_eq!(graph.map_type(), MapType::Waypoint);
    }
}
