//! Task and reference-binding types.
//!
//! A task pairs one query subtree with one cache-resident reference subtree.
//! Tasks are immutable once created: the queue computes their priority at push
//! time and never touches them again until they are popped.

use crate::exchange::CacheSlotId;
use crate::tree::TreeNode;

/// An imported reference subtree and the cache slot that holds it alive.
///
/// `table` is an opaque handle to the reference table the node belongs to; the
/// queue never inspects it, it only travels with the task so the consumer can
/// run the dual-tree computation. `cache_slot` identifies the exchange-cache
/// slot whose reference count covers this binding.
pub struct ReferenceBinding<T, N> {
    /// Handle to the reference table the node belongs to.
    pub table: T,
    /// The reference subtree.
    pub node: N,
    /// Exchange-cache slot holding the reference data.
    pub cache_slot: CacheSlotId,
}

impl<T, N> ReferenceBinding<T, N> {
    /// Bundle a reference table handle, node, and cache slot.
    pub fn new(table: T, node: N, cache_slot: CacheSlotId) -> Self {
        Self {
            table,
            node,
            cache_slot,
        }
    }
}

impl<T: Clone, N: Clone> Clone for ReferenceBinding<T, N> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            node: self.node.clone(),
            cache_slot: self.cache_slot,
        }
    }
}

/// One unit of dual-tree work: a (query subtree, reference subtree) pair.
///
/// `priority` is the negated midpoint of the squared range-distance interval
/// between the two bounds, so closer pairs carry greater priorities and
/// schedule first. Tasks are normally created by the queue's push path;
/// [`Task::new`] is public so custom drivers can feed a [`TaskHeap`] directly.
///
/// [`TaskHeap`]: crate::queue::TaskHeap
pub struct Task<T, N: TreeNode> {
    query: N,
    reference: ReferenceBinding<T, N>,
    priority: f64,
}

impl<T, N: TreeNode> Task<T, N> {
    /// Create a task with an already-computed priority.
    pub fn new(query: N, reference: ReferenceBinding<T, N>, priority: f64) -> Self {
        Self {
            query,
            reference,
            priority,
        }
    }

    /// The query subtree this task is bound to.
    pub fn query(&self) -> &N {
        &self.query
    }

    /// The reference binding this task will be evaluated against.
    pub fn reference(&self) -> &ReferenceBinding<T, N> {
        &self.reference
    }

    /// Exchange-cache slot backing the reference side.
    pub fn cache_slot(&self) -> CacheSlotId {
        self.reference.cache_slot
    }

    /// Scheduling priority; greater runs first.
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Consume the task, yielding the query handle and reference binding.
    pub fn into_parts(self) -> (N, ReferenceBinding<T, N>) {
        (self.query, self.reference)
    }
}

impl<T: Clone, N: TreeNode> Clone for Task<T, N> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            reference: self.reference.clone(),
            priority: self.priority,
        }
    }
}
