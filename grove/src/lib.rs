//! Grove - distributed dual-tree traversal engine, scheduling core
//!
//! A dual-tree algorithm recurses over pairs of tree nodes — one from a query
//! tree, one from a reference tree — pruning pairs whose bound proves them
//! irrelevant. In the distributed engine, each process owns a local query
//! tree and imports reference subtrees from peers through a reference-counted
//! exchange cache. This crate is the per-process scheduler that sits between
//! the two: it decides which (query subtree, reference subtree) pair runs
//! next, refines its work partition when workers contend, and keeps the
//! exchange cache's reference counts consistent with the tasks it holds.
//!
//! # High-Level API
//!
//! The queue itself is a single-threaded structure ([`DualTreeTaskQueue`]).
//! Most hosts run it behind the channel-fed daemon in [`service`]:
//!
//! ```ignore
//! use grove::service::{SchedulerConfig, SchedulerDaemon};
//!
//! let (daemon, client) = SchedulerDaemon::new(
//!     SchedulerConfig::default(),
//!     &query_table,
//!     metric,
//!     cache,
//! );
//! tokio::spawn(daemon.run(shutdown.clone()));
//!
//! // Producers push bindings; workers dequeue, compute, unlock.
//! client.push(slot, binding).await?;
//! ```
//!
//! Trees, metrics, and the exchange cache stay outside the crate: hosts
//! implement [`TreeNode`], [`QueryTable`], [`Metric`], and [`ReferenceCache`]
//! for their own types.

pub mod exchange;
pub mod logging;
pub mod metric;
pub mod queue;
pub mod service;
pub mod tree;

pub use exchange::{CacheSlotId, ReferenceCache};
pub use metric::{DistanceRange, Metric};
pub use queue::{
    DualTreeTaskQueue, QueueError, QueueStats, QueueStatsSnapshot, ReferenceBinding, SlotId, Task,
    TaskHeap,
};
pub use tree::{QueryTable, TreeNode};

/// Version of the Grove scheduling core.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
