//! Tree-side interfaces consumed by the scheduling core.
//!
//! The queue schedules pairs of tree nodes but owns no tree structure. Node
//! handles are cheap clones (typically reference-counted) into trees owned by
//! the query table or by the reference exchange layer; the queue only decides
//! which handles appear in its registry and never mutates the trees.

/// A handle to a node of a space-partitioning tree.
///
/// Handles must be cheap to clone; the queue duplicates them freely when it
/// refines its work partition. The same handle type serves both the local
/// query tree and imported reference subtrees.
pub trait TreeNode: Clone {
    /// The bounding region type fed to [`Metric::range_distance_sq`].
    ///
    /// [`Metric::range_distance_sq`]: crate::metric::Metric::range_distance_sq
    type Bound;

    /// Whether this node has no children.
    fn is_leaf(&self) -> bool;

    /// Number of points contained in the subtree rooted here.
    fn count(&self) -> usize;

    /// Left and right children, or `None` for a leaf.
    fn children(&self) -> Option<(Self, Self)>;

    /// Bounding region of the subtree rooted here.
    fn bound(&self) -> &Self::Bound;
}

/// The process-local query table.
///
/// The only operation the queue needs is the frontier decomposition: a set of
/// disjoint subtrees covering the tree's leaves, each holding at most
/// `max_size` points. These become the initial registry slots.
pub trait QueryTable {
    /// Node handle type of the table's tree.
    type Node: TreeNode;

    /// Disjoint frontier subtrees, each containing no more than `max_size`
    /// points.
    fn frontier_nodes(&self, max_size: usize) -> Vec<Self::Node>;
}
