//! Scheduler service configuration.

/// Default capacity of the scheduler request channel.
pub const DEFAULT_REQUEST_CHANNEL_CAPACITY: usize = 1024;

/// Default cap on the number of points per initial query subtree.
pub const DEFAULT_MAX_SUBTREE_SIZE: usize = 512;

/// Configuration for [`SchedulerDaemon`].
///
/// [`SchedulerDaemon`]: crate::service::SchedulerDaemon
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum points per frontier query subtree handed to the queue.
    pub max_subtree_size: usize,
    /// Request channel capacity; full channels push back on producers.
    pub channel_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_subtree_size: DEFAULT_MAX_SUBTREE_SIZE,
            channel_capacity: DEFAULT_REQUEST_CHANNEL_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Set the frontier subtree size cap.
    pub fn with_max_subtree_size(mut self, max_subtree_size: usize) -> Self {
        self.max_subtree_size = max_subtree_size;
        self
    }

    /// Set the request channel capacity.
    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }
}
