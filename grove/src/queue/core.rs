//! The dual-tree task queue.
//!
//! [`DualTreeTaskQueue`] owns the slot registry and implements the scheduler
//! surface: push, dequeue, unlock, split requests, and the splitter itself.
//! All methods take `&mut self`; serialization of concurrent callers happens
//! outside the queue (see the [`service`] module for the channel-fed front).
//!
//! [`service`]: crate::service

use std::sync::Arc;

use tracing::{debug, trace};

use super::error::QueueError;
use super::registry::{SlotId, SlotRegistry};
use super::stats::QueueStats;
use super::task::{ReferenceBinding, Task};
use crate::exchange::ReferenceCache;
use crate::metric::Metric;
use crate::tree::{QueryTable, TreeNode};

/// Priority-driven scheduler for (query subtree, reference subtree) pairs.
///
/// The queue holds one slot per query subtree. Each slot carries a lock bit
/// (held while a worker executes a task for that subtree, so partial results
/// are never mutated concurrently) and a max-heap of pending tasks. When
/// contention appears, callers request a split: at the next unlock the
/// largest eligible subtree is refined into its two children and its pending
/// tasks are redistributed across both halves, with matching reference-count
/// increments sent to the exchange cache.
///
/// # Type parameters
///
/// * `T` - Reference table handle carried through tasks (opaque to the queue)
/// * `N` - Tree node handle for both query and reference subtrees
pub struct DualTreeTaskQueue<T, N: TreeNode> {
    /// Query subtrees, their lock bits, and their pending tasks.
    registry: SlotRegistry<T, N>,
    /// One-shot latch serviced at the next unlock.
    split_requested: bool,
    /// Total pending tasks across all slots.
    remaining_tasks: usize,
    /// Exchange cache receiving reference-count increments on splits.
    cache: Arc<dyn ReferenceCache>,
    /// Lifetime counters.
    stats: Arc<QueueStats>,
}

impl<T: Clone, N: TreeNode> DualTreeTaskQueue<T, N> {
    /// Create a queue over the local query table's frontier.
    ///
    /// One free slot is created per frontier subtree of at most
    /// `max_subtree_size` points. The cache handle is retained for the
    /// queue's lifetime; the queue only ever calls `lock_cache` on it.
    pub fn new<Q>(query_table: &Q, max_subtree_size: usize, cache: Arc<dyn ReferenceCache>) -> Self
    where
        Q: QueryTable<Node = N>,
    {
        let frontier = query_table.frontier_nodes(max_subtree_size);
        debug!(
            slots = frontier.len(),
            max_subtree_size, "task queue initialized"
        );

        Self {
            registry: SlotRegistry::from_frontier(frontier),
            split_requested: false,
            remaining_tasks: 0,
            cache,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Enqueue a task pairing slot `slot`'s query subtree with `binding`.
    ///
    /// The priority is computed here from the current bounds; the caller is
    /// expected to already hold a cache reference for the binding. Pushing
    /// onto a held slot is permitted — the lock only guards pop and split.
    pub fn push<M>(
        &mut self,
        metric: &M,
        slot: SlotId,
        binding: ReferenceBinding<T, N>,
    ) -> Result<(), QueueError>
    where
        M: Metric<N::Bound>,
    {
        let slots = self.registry.len();
        if self.registry.get(slot).is_none() {
            return Err(QueueError::SlotOutOfRange { slot, slots });
        }

        self.enqueue_binding(metric, slot, binding);
        self.stats.record_push();
        Ok(())
    }

    /// Pop the best task bound to query subtree `slot`.
    ///
    /// Returns `Ok(None)` when the slot has no pending tasks or is held by
    /// another worker — the caller should probe a different slot or request
    /// a split. On success the slot's lock is taken iff `lock_on_take`, and
    /// the task is returned together with its slot index so the caller can
    /// pass the same index back to [`unlock`](Self::unlock).
    pub fn dequeue(
        &mut self,
        slot: SlotId,
        lock_on_take: bool,
    ) -> Result<Option<(Task<T, N>, SlotId)>, QueueError> {
        let slots = self.registry.len();
        let Some(state) = self.registry.get_mut(slot) else {
            return Err(QueueError::SlotOutOfRange { slot, slots });
        };

        if state.is_locked() || state.pending() == 0 {
            return Ok(None);
        }

        let Some(task) = state.pop_task() else {
            return Ok(None);
        };
        if lock_on_take {
            state.lock();
        }
        self.remaining_tasks -= 1;
        self.stats.record_dequeue();
        trace!(slot = %slot, priority = task.priority(), lock_on_take, "task dequeued");
        Ok(Some((task, slot)))
    }

    /// Release the lock on `slot` and service a pending split request.
    ///
    /// If a split was requested, the largest eligible slot (free, non-leaf,
    /// non-empty; ties broken by lowest index) is split; the request is
    /// cleared whether or not a split happened. Unlocking an already-free
    /// slot is benign and still services the request.
    pub fn unlock<M>(&mut self, metric: &M, slot: SlotId) -> Result<(), QueueError>
    where
        M: Metric<N::Bound>,
    {
        let slots = self.registry.len();
        let Some(state) = self.registry.get_mut(slot) else {
            return Err(QueueError::SlotOutOfRange { slot, slots });
        };
        state.unlock();

        if self.split_requested {
            match self.find_split_candidate() {
                Some(candidate) => self.split_slot(metric, candidate),
                None => debug!("split requested but no slot is eligible"),
            }
            self.split_requested = false;
        }
        Ok(())
    }

    /// Ask for one query-subtree split at the next unlock.
    ///
    /// Idempotent; the next unlock is the natural moment an unlocked,
    /// non-empty, internal slot is most likely to be available.
    pub fn request_split(&mut self) {
        trace!("query subtree split requested");
        self.split_requested = true;
        self.stats.record_split_request();
    }

    /// Number of registry slots. Monotonically non-decreasing.
    pub fn size(&self) -> usize {
        self.registry.len()
    }

    /// Whether no tasks remain in any slot.
    pub fn is_empty(&self) -> bool {
        self.remaining_tasks == 0
    }

    /// Total pending tasks across all slots.
    pub fn remaining_tasks(&self) -> usize {
        self.remaining_tasks
    }

    /// Whether a split request is latched and not yet serviced.
    pub fn split_requested(&self) -> bool {
        self.split_requested
    }

    /// Pending tasks in `slot`, or `None` if the index is out of range.
    pub fn pending_tasks(&self, slot: SlotId) -> Option<usize> {
        self.registry.get(slot).map(|state| state.pending())
    }

    /// Lock state of `slot`, or `None` if the index is out of range.
    pub fn is_locked(&self, slot: SlotId) -> Option<bool> {
        self.registry.get(slot).map(|state| state.is_locked())
    }

    /// Query subtree currently bound to `slot`.
    pub fn subtree(&self, slot: SlotId) -> Option<&N> {
        self.registry.get(slot).map(|state| state.subtree())
    }

    /// Shared handle to the queue's lifetime counters.
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Find the split target: the free, non-leaf, non-empty slot with the
    /// greatest point count; ties go to the lowest index.
    fn find_split_candidate(&self) -> Option<SlotId> {
        let mut best: Option<(SlotId, usize)> = None;
        for (id, state) in self.registry.iter() {
            if state.is_locked() || state.subtree().is_leaf() || state.pending() == 0 {
                continue;
            }
            let count = state.subtree().count();
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((id, count)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Refine `slot` into its two children and redistribute its tasks.
    ///
    /// The slot keeps the left child; the right child is appended as a new
    /// slot. Every drained task is re-paired with both halves (leaf
    /// references duplicate as-is, internal references expand into both of
    /// their children), and the exchange cache gains one reference per net
    /// new task so the exchange layer never evicts data a live task needs.
    fn split_slot<M>(&mut self, metric: &M, slot: SlotId)
    where
        M: Metric<N::Bound>,
    {
        let Some((left, right)) = self
            .registry
            .get(slot)
            .and_then(|state| state.subtree().children())
        else {
            // Eligibility already excluded leaves.
            return;
        };

        // The refined slot takes the left child; the right child is appended
        // before any task moves, so the new index equals the pre-append
        // length.
        if let Some(state) = self.registry.get_mut(slot) {
            state.replace_subtree(left);
        }
        let new_slot = self.registry.append(right);

        let drained = match self.registry.get_mut(slot) {
            Some(state) => state.drain_tasks(),
            None => Vec::new(),
        };
        self.remaining_tasks -= drained.len();
        let redistributed = drained.len();

        for task in drained {
            let (_, binding) = task.into_parts();
            let cache_slot = binding.cache_slot;

            if binding.node.is_leaf() {
                // Only the query side splits: one removed, two added.
                self.enqueue_binding(metric, slot, binding.clone());
                self.enqueue_binding(metric, new_slot, binding);
                self.cache.lock_cache(cache_slot, 1);
                self.stats.record_cache_locks(1);
            } else if let Some((ref_left, ref_right)) = binding.node.children() {
                // Both sides split: one removed, four added.
                let left_binding =
                    ReferenceBinding::new(binding.table.clone(), ref_left, cache_slot);
                let right_binding = ReferenceBinding::new(binding.table, ref_right, cache_slot);
                self.enqueue_binding(metric, slot, left_binding.clone());
                self.enqueue_binding(metric, slot, right_binding.clone());
                self.enqueue_binding(metric, new_slot, left_binding);
                self.enqueue_binding(metric, new_slot, right_binding);
                self.cache.lock_cache(cache_slot, 3);
                self.stats.record_cache_locks(3);
            }
        }

        self.stats.record_split();
        debug!(
            slot = %slot,
            new_slot = %new_slot,
            redistributed,
            "query subtree split"
        );
    }

    /// Compute the priority of `binding` against `slot`'s current subtree and
    /// enqueue the task, keeping the remaining-task counter in step.
    fn enqueue_binding<M>(&mut self, metric: &M, slot: SlotId, binding: ReferenceBinding<T, N>)
    where
        M: Metric<N::Bound>,
    {
        let Some(state) = self.registry.get(slot) else {
            return;
        };
        let range = metric.range_distance_sq(state.subtree().bound(), binding.node.bound());
        let priority = -range.mid();
        let task = Task::new(state.subtree().clone(), binding, priority);

        if let Some(state) = self.registry.get_mut(slot) {
            state.push_task(task);
            self.remaining_tasks += 1;
            trace!(slot = %slot, priority, "task enqueued");
        }
    }
}
