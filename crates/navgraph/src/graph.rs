//! The [`Graph`] every builder produces and every path search consumes.

use std::{collections::VecDeque, ops::Index};

use glam::Vec3;
use thiserror::Error;

use crate::{MapType, Node, NodeId, SearchState, position_index::PositionIndex};

/// A fixed set of traversable [`Node`]s and the links between them.
///
/// Built once by one of the builders and immutable afterwards. Node ids equal their index in
/// [`Graph::nodes`], and every neighbor id refers to a node of the same graph.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "SerializedGraph", into = "SerializedGraph")
)]
pub struct Graph {
    map_type: MapType,
    nodes: Vec<Node>,
    index: PositionIndex,
}

impl Graph {
    /// Wraps nodes whose ids already match their index and whose neighbor lists are final.
    pub(crate) fn from_built_nodes(map_type: MapType, nodes: Vec<Node>, cell_size: f32) -> Self {
        let index = PositionIndex::new(cell_size, &nodes);
        let graph = Self {
            map_type,
            nodes,
            index,
        };
        debug_assert!(
            graph.validate().is_ok(),
            "builder produced an invalid graph: {:?}",
            graph.validate()
        );
        graph
    }

    /// Creates a graph without nodes.
    pub fn empty(map_type: MapType) -> Self {
        Self::from_built_nodes(map_type, Vec::new(), 1.0)
    }

    /// Creates a graph from positions and neighbor lists given per node, in node order.
    ///
    /// This is the way in for graphs built outside this crate. The result is validated
    /// with [`Graph::validate`].
    pub fn from_adjacency(
        map_type: MapType,
        nodes: impl IntoIterator<Item = (Vec3, Vec<NodeId>)>,
    ) -> Result<Self, GraphError> {
        let nodes = nodes
            .into_iter()
            .enumerate()
            .map(|(i, (position, neighbors))| {
                let mut node = Node::new(NodeId::from_index(i), position);
                node.set_neighbors(neighbors);
                node
            })
            .collect();
        let graph = Self {
            map_type,
            index: PositionIndex::default(),
            nodes,
        };
        graph.validate()?;
        Ok(graph.reindexed(1.0))
    }

    fn reindexed(mut self, cell_size: f32) -> Self {
        self.index = PositionIndex::new(cell_size, &self.nodes);
        self
    }

    /// The builder this graph came from.
    #[inline]
    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    /// All nodes, in id order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of one-way links. A symmetric link between two nodes counts twice.
    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|node| node.neighbors().len()).sum()
    }

    /// Returns the node with the given id, or `None` if it is not part of this graph.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the first node whose position is exactly `position`.
    ///
    /// Positions are compared with float equality, so a position that went through a different
    /// computation than the node's may miss. Use [`Graph::node_near`] for a tolerant lookup.
    pub fn node_at(&self, position: Vec3) -> Option<&Node> {
        let id = self.index.find_exact(&self.nodes, position)?;
        self.node(id)
    }

    /// Returns the node closest to `position` within `tolerance`. Ties go to the lower id.
    pub fn node_near(&self, position: Vec3, tolerance: f32) -> Option<&Node> {
        let id = self.index.find_nearest(&self.nodes, position, tolerance)?;
        self.node(id)
    }

    /// Returns the index of `node` in [`Graph::nodes`].
    ///
    /// `node` has to be borrowed from this graph. An equal node of another graph, a clone of this
    /// one included, returns `None`.
    pub fn index_of(&self, node: &Node) -> Option<usize> {
        let index = node.id().index();
        std::ptr::eq(self.nodes.get(index)?, node).then_some(index)
    }

    /// The neighbors of the node with the given id. Empty if the id is not part of this graph.
    #[inline]
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::neighbors).unwrap_or_default()
    }

    /// Creates a fresh [`SearchState`] covering every node of this graph.
    pub fn search_state(&self) -> SearchState {
        SearchState::new(self.nodes.len())
    }

    /// All nodes reachable from `start`, including `start`, in breadth-first order.
    ///
    /// Empty if `start` is not part of this graph.
    pub fn reachable_from(&self, start: NodeId) -> Vec<NodeId> {
        if self.node(start).is_none() {
            return Vec::new();
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start.index()] = true;
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &neighbor in self.neighbors(current) {
                if !visited[neighbor.index()] {
                    visited[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        order
    }

    /// Returns `true` if every node can reach every other node. Empty graphs count as connected.
    ///
    /// Following links in their stored direction only; for the symmetric graph types this is
    /// plain connectivity.
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        if self.map_type.is_symmetric() {
            return self.reachable_from(NodeId(0)).len() == self.nodes.len();
        }
        (0..self.nodes.len())
            .all(|i| self.reachable_from(NodeId::from_index(i)).len() == self.nodes.len())
    }

    /// Checks the structural invariants of the graph.
    ///
    /// - Every node's id equals its index.
    /// - Neighbor ids refer to nodes of this graph.
    /// - No node neighbors itself or lists a neighbor twice.
    /// - For [`MapType::Grid`] and [`MapType::NavMesh`], every link has a link back.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id().index() != index {
                return Err(GraphError::MisplacedNode {
                    index,
                    id: node.id(),
                });
            }
            for (n, &neighbor) in node.neighbors().iter().enumerate() {
                if neighbor == node.id() {
                    return Err(GraphError::SelfNeighbor { node: node.id() });
                }
                let Some(other) = self.node(neighbor) else {
                    return Err(GraphError::DanglingNeighbor {
                        node: node.id(),
                        neighbor,
                    });
                };
                if node.neighbors()[..n].contains(&neighbor) {
                    return Err(GraphError::DuplicateNeighbor {
                        node: node.id(),
                        neighbor,
                    });
                }
                if self.map_type.is_symmetric() && !other.neighbors().contains(&node.id()) {
                    return Err(GraphError::AsymmetricNeighbor {
                        node: node.id(),
                        neighbor,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Index<NodeId> for Graph {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if `id` is not part of this graph.
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.map_type == other.map_type && self.nodes == other.nodes
    }
}

/// A structural invariant of a [`Graph`] that does not hold. Returned by [`Graph::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Happens when a node is stored at an index other than its id.
    #[error("Node {id:?} is stored at index {index}")]
    MisplacedNode {
        /// Where the node is stored
        index: usize,
        /// The id the node carries
        id: NodeId,
    },
    /// Happens when a neighbor id does not belong to the graph.
    #[error("Node {node:?} links to {neighbor:?}, which is not part of the graph")]
    DanglingNeighbor {
        /// The node holding the link
        node: NodeId,
        /// The missing neighbor
        neighbor: NodeId,
    },
    /// Happens when a node lists itself as neighbor.
    #[error("Node {node:?} links to itself")]
    SelfNeighbor {
        /// The offending node
        node: NodeId,
    },
    /// Happens when a node lists the same neighbor twice.
    #[error("Node {node:?} links to {neighbor:?} more than once")]
    DuplicateNeighbor {
        /// The node holding the links
        node: NodeId,
        /// The repeated neighbor
        neighbor: NodeId,
    },
    /// Happens when a link in a symmetric graph has no link back.
    #[error("Node {node:?} links to {neighbor:?}, but not the other way around")]
    AsymmetricNeighbor {
        /// The node holding the link
        node: NodeId,
        /// The neighbor without a link back
        neighbor: NodeId,
    },
}

#[cfg(feature = "serialize")]
#[derive(serde::Serialize, serde::Deserialize)]
struct SerializedGraph {
    map_type: MapType,
    cell_size: f32,
    nodes: Vec<Node>,
}

#[cfg(feature = "serialize")]
impl From<Graph> for SerializedGraph {
    fn from(graph: Graph) -> Self {
        Self {
            map_type: graph.map_type,
            cell_size: graph.index.cell_size(),
            nodes: graph.nodes,
        }
    }
}

#[cfg(feature = "serialize")]
impl TryFrom<SerializedGraph> for Graph {
    type Error = GraphError;

    fn try_from(serialized: SerializedGraph) -> Result<Self, Self::Error> {
        let graph = Self {
            map_type: serialized.map_type,
            nodes: serialized.nodes,
            index: PositionIndex::default(),
        };
        graph.validate()?;
        Ok(graph.reindexed(serialized.cell_size))
    }
}
