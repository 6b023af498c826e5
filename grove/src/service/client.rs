//! Client handle for the scheduler daemon.
//!
//! Producers (the exchange driver, on receipt of a new reference subtree) and
//! workers share cloneable [`SchedulerClient`] handles. Every queue operation
//! becomes a message to the owning daemon; operations that produce a value
//! carry a oneshot reply channel.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

use super::daemon::{SchedulerRequest, SchedulerStatus};
use crate::queue::{ReferenceBinding, SlotId, Task};
use crate::tree::TreeNode;

/// Error when submitting a queue operation to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerClientError {
    /// Channel is full (backpressure). Retry later or shed the work.
    ChannelFull,

    /// Channel is closed (daemon shut down). No more operations possible.
    ChannelClosed,
}

impl fmt::Display for SchedulerClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerClientError::ChannelFull => write!(f, "scheduler request channel is full"),
            SchedulerClientError::ChannelClosed => write!(f, "scheduler daemon has shut down"),
        }
    }
}

impl std::error::Error for SchedulerClientError {}

/// Handle for submitting queue operations to a [`SchedulerDaemon`].
///
/// Cloneable and shareable across tasks; all clones feed the same daemon, so
/// the queue's serialization guarantee holds no matter how many workers hold
/// handles.
///
/// [`SchedulerDaemon`]: crate::service::SchedulerDaemon
pub struct SchedulerClient<T, N: TreeNode> {
    request_tx: mpsc::Sender<SchedulerRequest<T, N>>,
}

impl<T, N: TreeNode> Clone for SchedulerClient<T, N> {
    fn clone(&self) -> Self {
        Self {
            request_tx: self.request_tx.clone(),
        }
    }
}

impl<T, N: TreeNode> SchedulerClient<T, N> {
    pub(crate) fn new(request_tx: mpsc::Sender<SchedulerRequest<T, N>>) -> Self {
        Self { request_tx }
    }

    /// Enqueue a task for `slot`, waiting for channel capacity.
    pub async fn push(
        &self,
        slot: SlotId,
        binding: ReferenceBinding<T, N>,
    ) -> Result<(), SchedulerClientError> {
        self.request_tx
            .send(SchedulerRequest::Push { slot, binding })
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)
    }

    /// Enqueue a task for `slot` without waiting.
    pub fn try_push(
        &self,
        slot: SlotId,
        binding: ReferenceBinding<T, N>,
    ) -> Result<(), SchedulerClientError> {
        self.request_tx
            .try_send(SchedulerRequest::Push { slot, binding })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => SchedulerClientError::ChannelFull,
                mpsc::error::TrySendError::Closed(_) => SchedulerClientError::ChannelClosed,
            })
    }

    /// Pop the best task for `slot`, taking its lock iff `lock_on_take`.
    ///
    /// `Ok(None)` means the slot is empty or held — the caller should probe
    /// another slot or ask for a split.
    pub async fn dequeue(
        &self,
        slot: SlotId,
        lock_on_take: bool,
    ) -> Result<Option<(Task<T, N>, SlotId)>, SchedulerClientError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request_tx
            .send(SchedulerRequest::Dequeue {
                slot,
                lock_on_take,
                reply,
            })
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)?;
        reply_rx
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)
    }

    /// Release the lock on `slot` (and service a pending split request).
    pub async fn unlock(&self, slot: SlotId) -> Result<(), SchedulerClientError> {
        self.request_tx
            .send(SchedulerRequest::Unlock { slot })
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)
    }

    /// Ask for one query-subtree split at the next unlock.
    pub async fn request_split(&self) -> Result<(), SchedulerClientError> {
        self.request_tx
            .send(SchedulerRequest::RequestSplit)
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)
    }

    /// Ask for a split without waiting for channel capacity.
    pub fn try_request_split(&self) -> Result<(), SchedulerClientError> {
        self.request_tx
            .try_send(SchedulerRequest::RequestSplit)
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => SchedulerClientError::ChannelFull,
                mpsc::error::TrySendError::Closed(_) => SchedulerClientError::ChannelClosed,
            })
    }

    /// Point-in-time slot and task counts.
    pub async fn status(&self) -> Result<SchedulerStatus, SchedulerClientError> {
        let (reply, reply_rx) = oneshot::channel();
        self.request_tx
            .send(SchedulerRequest::Status { reply })
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)?;
        reply_rx
            .await
            .map_err(|_| SchedulerClientError::ChannelClosed)
    }

    /// Whether no tasks remain in the queue.
    pub async fn is_empty(&self) -> Result<bool, SchedulerClientError> {
        Ok(self.status().await?.is_empty())
    }

    /// Whether the daemon is still accepting operations.
    pub fn is_connected(&self) -> bool {
        !self.request_tx.is_closed()
    }
}
