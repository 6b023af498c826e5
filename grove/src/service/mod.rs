//! Serialized front for the dual-tree task queue.
//!
//! The queue promises that no two of its operations interleave (see the
//! scheduling model in [`crate::queue`]). This module realizes that promise
//! with a single owning task: [`SchedulerDaemon`] holds the queue and drains
//! a request channel, while any number of [`SchedulerClient`] clones submit
//! operations from producers and workers.
//!
//! Hosts that already serialize access (a single driver loop, an external
//! mutex) can use [`DualTreeTaskQueue`] directly and skip this module.
//!
//! [`DualTreeTaskQueue`]: crate::queue::DualTreeTaskQueue

mod client;
mod config;
mod daemon;

pub use client::{SchedulerClient, SchedulerClientError};
pub use config::{SchedulerConfig, DEFAULT_MAX_SUBTREE_SIZE, DEFAULT_REQUEST_CHANNEL_CAPACITY};
pub use daemon::{SchedulerDaemon, SchedulerStatus};
