//! Shared fixtures for the scheduler integration tests.
//!
//! A one-dimensional metric space over unit-spaced points: balanced binary
//! trees whose bounds are closed intervals, the squared range-distance
//! metric over those intervals, and a cache mock that records reference
//! locks.

use std::sync::{Arc, Mutex};

use grove::{CacheSlotId, DistanceRange, Metric, QueryTable, ReferenceBinding, ReferenceCache, TreeNode};

/// Closed interval bound over point positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

pub struct PointNodeData {
    bound: Interval,
    count: usize,
    children: Option<(PointNode, PointNode)>,
}

/// Handle to a node of a balanced binary tree over unit-spaced points.
#[derive(Clone)]
pub struct PointNode(Arc<PointNodeData>);

impl TreeNode for PointNode {
    type Bound = Interval;

    fn is_leaf(&self) -> bool {
        self.0.children.is_none()
    }

    fn count(&self) -> usize {
        self.0.count
    }

    fn children(&self) -> Option<(Self, Self)> {
        self.0.children.clone()
    }

    fn bound(&self) -> &Self::Bound {
        &self.0.bound
    }
}

/// Balanced binary tree over the points `lo..=hi`.
pub fn build_tree(lo: u32, hi: u32) -> PointNode {
    let children = if lo == hi {
        None
    } else {
        let mid = (lo + hi) / 2;
        Some((build_tree(lo, mid), build_tree(mid + 1, hi)))
    };
    PointNode(Arc::new(PointNodeData {
        bound: Interval {
            lo: lo as f64,
            hi: hi as f64,
        },
        count: (hi - lo + 1) as usize,
        children,
    }))
}

/// Single-point reference node at position `x`.
pub fn leaf_at(x: u32) -> PointNode {
    build_tree(x, x)
}

/// Reference binding with an opaque unit table handle.
pub fn binding(node: PointNode, id: u64) -> ReferenceBinding<(), PointNode> {
    ReferenceBinding::new((), node, CacheSlotId::new(id))
}

/// Query table over a balanced tree.
pub struct PointTable {
    root: PointNode,
}

impl PointTable {
    pub fn new(points: u32) -> Self {
        Self {
            root: build_tree(0, points - 1),
        }
    }
}

impl QueryTable for PointTable {
    type Node = PointNode;

    fn frontier_nodes(&self, max_size: usize) -> Vec<PointNode> {
        fn collect(node: &PointNode, max_size: usize, out: &mut Vec<PointNode>) {
            if node.is_leaf() || node.count() <= max_size {
                out.push(node.clone());
            } else if let Some((left, right)) = node.children() {
                collect(&left, max_size, out);
                collect(&right, max_size, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.root, max_size, &mut out);
        out
    }
}

/// The one-dimensional squared range-distance metric: for disjoint intervals
/// the nearest squared gap, zero otherwise; the farthest squared span on top.
pub struct LineMetric;

impl Metric<Interval> for LineMetric {
    fn range_distance_sq(&self, query: &Interval, reference: &Interval) -> DistanceRange {
        let gap = if reference.lo > query.hi {
            reference.lo - query.hi
        } else if query.lo > reference.hi {
            query.lo - reference.hi
        } else {
            0.0
        };
        let span = (reference.hi - query.lo)
            .abs()
            .max((query.hi - reference.lo).abs());
        DistanceRange::new(gap * gap, span * span)
    }
}

/// Exchange-cache mock that records every `lock_cache` call.
#[derive(Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<(CacheSlotId, usize)>>,
}

impl RecordingCache {
    /// Total references added for one cache slot.
    pub fn total_for(&self, slot: CacheSlotId) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == slot)
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of `lock_cache` calls recorded.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<(CacheSlotId, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ReferenceCache for RecordingCache {
    fn lock_cache(&self, slot: CacheSlotId, count: usize) {
        self.calls.lock().unwrap().push((slot, count));
    }
}
