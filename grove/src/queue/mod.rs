//! Distributed dual-tree task queue.
//!
//! This module is the per-process scheduling core of the traversal engine.
//! It decides which (query subtree, reference subtree) pair runs next,
//! refines its work partition when contention appears, and keeps the
//! exchange cache's reference counts consistent with the tasks it holds.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DualTreeTaskQueue                        │
//! │  push / dequeue / unlock / request_split / size / is_empty   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ SlotRegistry │  │ TaskHeap     │  │ QueueStats         │  │
//! │  │ subtree +    │  │ per slot,    │  │ lifetime counters  │  │
//! │  │ lock bit     │  │ stable max   │  │                    │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └───────────────┬──────────────────────────────────────────────┘
//!                 │ lock_cache(slot, n) on splits
//!                 ▼
//!        exchange::ReferenceCache
//! ```
//!
//! # Core Concepts
//!
//! - **Slot**: one query subtree with a lock bit and a priority heap of
//!   pending tasks. Slot indices are stable; the registry only appends.
//!
//! - **Lock**: held from a successful `dequeue(.., lock_on_take = true)`
//!   until the matching `unlock`. While held, no task is popped from the
//!   slot and the slot is never chosen for splitting, so a worker's partial
//!   results for that subtree are never mutated concurrently.
//!
//! - **Split**: a deferred, best-effort refinement. `request_split` latches
//!   a flag; the next `unlock` picks the largest free, non-leaf, non-empty
//!   slot, replaces it with its left child, appends the right child as a new
//!   slot, and re-pairs every drained task with both halves. Each net new
//!   task is matched by a `lock_cache` reference so the exchange layer never
//!   evicts data a live task still needs.
//!
//! The queue is a single-threaded cooperative structure: operations take
//! `&mut self` and never block. Concurrent workers are serialized at the
//! queue boundary — see [`crate::service`] for the channel-fed owning-task
//! front.

mod core;
mod error;
mod heap;
mod registry;
mod stats;
mod task;

pub use self::core::DualTreeTaskQueue;
pub use error::QueueError;
pub use heap::TaskHeap;
pub use registry::SlotId;
pub use stats::{QueueStats, QueueStatsSnapshot};
pub use task::{ReferenceBinding, Task};
