use crate::NodeId;

/// Per-search bookkeeping owned by a path search running over a [`Graph`](crate::Graph).
///
/// The graph itself never changes after it is built. A search records which node it reached
/// every other node from here and walks those parents back to reconstruct its path.
/// Call [`SearchState::reset`] between searches, or create a fresh state per search with
/// [`Graph::search_state`](crate::Graph::search_state).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    parents: Vec<Option<NodeId>>,
}

impl SearchState {
    /// Creates a state for a graph with `node_count` nodes, with no parents set.
    pub fn new(node_count: usize) -> Self {
        Self {
            parents: vec![None; node_count],
        }
    }

    /// Number of nodes this state covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns `true` if the state covers no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// The node `id` was reached from, if any. `None` for ids outside the graph.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Sets the node `id` was reached from and returns the previous parent.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.parents[id.index()], parent)
    }

    /// Clears every parent.
    pub fn reset(&mut self) {
        self.parents.fill(None);
    }

    /// Returns `true` if no node has a parent.
    pub fn is_reset(&self) -> bool {
        self.parents.iter().all(Option::is_none)
    }

    /// Walks the parents back from `goal` and returns the path from its root to `goal`.
    ///
    /// A parent chain that loops back on itself is cut after visiting every node once.
    pub fn path_to(&self, goal: NodeId) -> Vec<NodeId> {
        if goal.index() >= self.parents.len() {
            return Vec::new();
        }
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(parent) = self.parent(current) {
            if path.len() > self.parents.len() {
                break;
            }
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}
