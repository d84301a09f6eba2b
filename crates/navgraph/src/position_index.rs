use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;

use crate::{Node, NodeId};

/// Buckets node ids by quantized position so lookups don't scan the whole graph.
///
/// Buckets are filled in id order, so the first match inside a bucket is also the first
/// match in the node vector.
#[derive(Debug, Clone, Default)]
pub(crate) struct PositionIndex {
    cell_size: f32,
    buckets: FxHashMap<IVec3, Vec<NodeId>>,
}

impl PositionIndex {
    const DEFAULT_CELL_SIZE: f32 = 1.0;

    pub(crate) fn new(cell_size: f32, nodes: &[Node]) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            Self::DEFAULT_CELL_SIZE
        };
        let mut index = Self {
            cell_size,
            buckets: FxHashMap::default(),
        };
        for node in nodes {
            let cell = index.cell(node.position());
            index.buckets.entry(cell).or_default().push(node.id());
        }
        index
    }

    #[inline]
    #[cfg_attr(not(feature = "serialize"), allow(dead_code))]
    pub(crate) fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    /// First node whose position is exactly `position`.
    pub(crate) fn find_exact(&self, nodes: &[Node], position: Vec3) -> Option<NodeId> {
        self.buckets
            .get(&self.cell(position))?
            .iter()
            .copied()
            .find(|id| nodes[id.index()].position() == position)
    }

    /// Closest node within `tolerance` of `position`. Ties go to the lower id.
    pub(crate) fn find_nearest(
        &self,
        nodes: &[Node],
        position: Vec3,
        tolerance: f32,
    ) -> Option<NodeId> {
        if tolerance.is_nan() || tolerance < 0.0 || position.is_nan() {
            return None;
        }
        let max_distance_squared = tolerance * tolerance;
        let closer = |best: Option<(NodeId, f32)>, id: NodeId| {
            let distance_squared = nodes[id.index()].position().distance_squared(position);
            if distance_squared > max_distance_squared {
                return best;
            }
            match best {
                Some((best_id, best_distance))
                    if best_distance < distance_squared
                        || (best_distance == distance_squared && best_id < id) =>
                {
                    best
                }
                _ => Some((id, distance_squared)),
            }
        };

        let scan_all = || {
            nodes
                .iter()
                .map(Node::id)
                .fold(None, closer)
                .map(|(id, _)| id)
        };
        if !tolerance.is_finite() {
            return scan_all();
        }
        let min = self.cell(position - Vec3::splat(tolerance));
        let max = self.cell(position + Vec3::splat(tolerance));
        let extent = max.as_i64vec3() - min.as_i64vec3() + 1;
        let cell_count = extent.x.saturating_mul(extent.y).saturating_mul(extent.z);
        if cell_count > self.buckets.len() as i64 {
            // Visiting the covered cells would cost more than looking at every node.
            return scan_all();
        }

        let mut best = None;
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    let Some(bucket) = self.buckets.get(&IVec3::new(x, y, z)) else {
                        continue;
                    };
                    best = bucket.iter().copied().fold(best, closer);
                }
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(3.0, 1.0, -2.0),
            Vec3::new(0.5, 0.0, 0.0),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, position)| Node::new(NodeId::from_index(i), position))
        .collect()
    }

    #[test]
    fn exact_lookup_returns_first_match() {
        let nodes = nodes();
        let index = PositionIndex::new(1.0, &nodes);
        assert_eq!(
            index.find_exact(&nodes, Vec3::new(0.5, 0.0, 0.0)),
            Some(NodeId(1))
        );
        assert_eq!(
            index.find_exact(&nodes, Vec3::new(3.0, 1.0, -2.0)),
            Some(NodeId(2))
        );
        assert_eq!(index.find_exact(&nodes, Vec3::new(0.5, 0.0, 0.1)), None);
    }

    #[test]
    fn nearest_lookup_respects_tolerance() {
        let nodes = nodes();
        let index = PositionIndex::new(1.0, &nodes);
        assert_eq!(
            index.find_nearest(&nodes, Vec3::new(2.9, 1.0, -2.0), 0.2),
            Some(NodeId(2))
        );
        assert_eq!(
            index.find_nearest(&nodes, Vec3::new(2.0, 1.0, -2.0), 0.2),
            None
        );
        assert_eq!(
            index.find_nearest(&nodes, Vec3::new(0.4, 0.0, 0.0), 1.0),
            Some(NodeId(1))
        );
    }

    #[test]
    fn huge_tolerance_falls_back_to_scan() {
        let nodes = nodes();
        let index = PositionIndex::new(0.01, &nodes);
        assert_eq!(
            index.find_nearest(&nodes, Vec3::new(100.0, 0.0, 0.0), f32::INFINITY),
            Some(NodeId(2))
        );
    }

    #[test]
    fn invalid_cell_size_falls_back_to_default() {
        let index = PositionIndex::new(0.0, &nodes());
        assert_eq!(index.cell_size(), PositionIndex::DEFAULT_CELL_SIZE);
    }
}
