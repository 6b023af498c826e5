//! Query-subtree registry.
//!
//! The registry maps a slot index to a query subtree, its lock bit, and its
//! pending-task heap. Indices are stable for the lifetime of the queue: the
//! only growth operation is append (used by the splitter), and slots are
//! never removed or reordered. A slot whose subtree is a leaf and whose heap
//! is empty is simply inert.

use std::fmt;

use super::heap::TaskHeap;
use super::task::Task;
use crate::tree::TreeNode;

/// Index of a registry slot.
///
/// Returned from dequeue alongside the task so the caller can hand the same
/// index back to unlock. Once handed out, an index stays valid for every
/// subsequent operation on the same queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Create a slot id from a raw index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw index of this slot.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registry slot: a query subtree, its lock bit, and its pending tasks.
pub(crate) struct Slot<T, N: TreeNode> {
    subtree: N,
    locked: bool,
    tasks: TaskHeap<T, N>,
}

impl<T, N: TreeNode> Slot<T, N> {
    fn new(subtree: N) -> Self {
        Self {
            subtree,
            locked: false,
            tasks: TaskHeap::new(),
        }
    }

    pub(crate) fn subtree(&self) -> &N {
        &self.subtree
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }

    pub(crate) fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn push_task(&mut self, task: Task<T, N>) {
        self.tasks.push(task);
    }

    pub(crate) fn pop_task(&mut self) -> Option<Task<T, N>> {
        self.tasks.pop()
    }

    pub(crate) fn drain_tasks(&mut self) -> Vec<Task<T, N>> {
        self.tasks.drain()
    }

    /// Swap in a refined subtree handle. Only the splitter calls this, and
    /// only on a free slot.
    pub(crate) fn replace_subtree(&mut self, subtree: N) {
        self.subtree = subtree;
    }
}

/// Append-only collection of registry slots.
pub(crate) struct SlotRegistry<T, N: TreeNode> {
    slots: Vec<Slot<T, N>>,
}

impl<T, N: TreeNode> SlotRegistry<T, N> {
    /// Build the initial registry, one free slot per frontier subtree.
    pub(crate) fn from_frontier(subtrees: Vec<N>) -> Self {
        Self {
            slots: subtrees.into_iter().map(Slot::new).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<&Slot<T, N>> {
        self.slots.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut Slot<T, N>> {
        self.slots.get_mut(id.index())
    }

    /// Append a new free slot for `subtree` and return its id.
    pub(crate) fn append(&mut self, subtree: N) -> SlotId {
        let id = SlotId::new(self.slots.len());
        self.slots.push(Slot::new(subtree));
        id
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (SlotId, &Slot<T, N>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (SlotId::new(index), slot))
    }
}
