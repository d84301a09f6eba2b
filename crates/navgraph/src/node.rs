use std::ops::Deref;

use glam::Vec3;

/// Identifies a [`Node`] inside a [`Graph`](crate::Graph).
///
/// Equal to the node's index in [`Graph::nodes`](crate::Graph::nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(pub u32);

impl Deref for NodeId {
    type Target = u32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

impl NodeId {
    /// The id as an index into the node vector.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The id of the node at `index` in the node vector.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit into a `u32`.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        let Ok(id) = u32::try_from(index) else {
            panic!("Node index {index} does not fit into a u32");
        };
        NodeId(id)
    }
}

/// A traversable point in a [`Graph`](crate::Graph).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    id: NodeId,
    position: Vec3,
    /// Never contains duplicates or `id` itself.
    neighbors: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, position: Vec3) -> Self {
        Self {
            id,
            position,
            neighbors: Vec::new(),
        }
    }

    /// The id of this node.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The world position of this node.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The nodes reachable from this node in one step.
    #[inline]
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Adds a one-way link to `neighbor`.
    ///
    /// Returns `false` if the link was a self link or already present.
    pub(crate) fn add_neighbor(&mut self, neighbor: NodeId) -> bool {
        if neighbor == self.id || self.neighbors.contains(&neighbor) {
            return false;
        }
        self.neighbors.push(neighbor);
        true
    }

    /// Replaces the neighbor list wholesale. The graph checks the result, not this method.
    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<NodeId>) {
        self.neighbors = neighbors;
    }
}

/// Links `a` and `b` in both directions. Self pairs and existing links are skipped.
///
/// # Panics
///
/// Panics if either id is out of bounds for `nodes`.
pub(crate) fn make_neighbors(nodes: &mut [Node], a: NodeId, b: NodeId) {
    if a == b {
        return;
    }
    nodes[a.index()].add_neighbor(b);
    nodes[b.index()].add_neighbor(a);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        (0..3)
            .map(|i| Node::new(NodeId(i), Vec3::new(i as f32, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn can_retrieve_node_data_after_creation() {
        let node = Node::new(NodeId(4), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.id(), NodeId(4));
        assert_eq!(node.position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(node.neighbors().is_empty());
    }

    #[test]
    fn node_rejects_self_and_duplicate_links() {
        let mut node = Node::new(NodeId(0), Vec3::ZERO);
        assert!(!node.add_neighbor(NodeId(0)));
        assert!(node.add_neighbor(NodeId(1)));
        assert!(!node.add_neighbor(NodeId(1)));
        assert_eq!(node.neighbors(), &[NodeId(1)]);
    }

    #[test]
    fn make_neighbors_links_both_ways() {
        let mut nodes = nodes();
        make_neighbors(&mut nodes, NodeId(0), NodeId(2));
        make_neighbors(&mut nodes, NodeId(2), NodeId(0));
        make_neighbors(&mut nodes, NodeId(1), NodeId(1));
        assert_eq!(nodes[0].neighbors(), &[NodeId(2)]);
        assert_eq!(nodes[2].neighbors(), &[NodeId(0)]);
        assert!(nodes[1].neighbors().is_empty());
    }

    #[test]
    fn ids_match_their_index() {
        assert_eq!(NodeId::from_index(7), NodeId(7));
        assert_eq!(NodeId::from_index(u32::MAX as usize).index(), u32::MAX as usize);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "does not fit into a u32")]
    fn ids_beyond_u32_panic_instead_of_wrapping() {
        NodeId::from_index(u32::MAX as usize + 1);
    }
}
