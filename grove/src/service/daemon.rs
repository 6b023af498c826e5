//! The scheduler daemon: single owning task for the dual-tree queue.
//!
//! The queue itself is a single-threaded structure; [`SchedulerDaemon`]
//! realizes its serialization contract by owning the queue on one task and
//! draining a request channel. Producers and workers talk to it through
//! cloneable [`SchedulerClient`] handles, so no two queue operations ever
//! interleave.
//!
//! # Example
//!
//! ```ignore
//! use grove::service::{SchedulerDaemon, SchedulerConfig};
//!
//! let (daemon, client) = SchedulerDaemon::new(config, &query_table, metric, cache);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(daemon.run(shutdown.clone()));
//!
//! client.push(slot, binding).await?;
//! if let Some((task, slot)) = client.dequeue(slot, true).await? {
//!     // run the dual-tree computation for `task`, then:
//!     client.unlock(slot).await?;
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::client::SchedulerClient;
use super::config::SchedulerConfig;
use crate::exchange::ReferenceCache;
use crate::metric::Metric;
use crate::queue::{DualTreeTaskQueue, QueueStats, ReferenceBinding, SlotId, Task};
use crate::tree::{QueryTable, TreeNode};

/// A queue operation travelling from a client to the daemon.
pub(crate) enum SchedulerRequest<T, N: TreeNode> {
    Push {
        slot: SlotId,
        binding: ReferenceBinding<T, N>,
    },
    Dequeue {
        slot: SlotId,
        lock_on_take: bool,
        reply: oneshot::Sender<Option<(Task<T, N>, SlotId)>>,
    },
    Unlock {
        slot: SlotId,
    },
    RequestSplit,
    Status {
        reply: oneshot::Sender<SchedulerStatus>,
    },
}

/// Point-in-time view of the queue, answered to a status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    /// Number of registry slots.
    pub slots: usize,
    /// Total pending tasks across all slots.
    pub remaining_tasks: usize,
}

impl SchedulerStatus {
    /// Whether no tasks remain.
    pub fn is_empty(&self) -> bool {
        self.remaining_tasks == 0
    }
}

/// Long-running owner of a [`DualTreeTaskQueue`].
///
/// Created together with its first client; runs until the shutdown token
/// fires or every client has been dropped. Invalid slot indices arriving
/// over the channel are logged and answered with an empty result — they
/// never corrupt the queue.
///
/// # Type Parameters
///
/// * `T` - Reference table handle carried through tasks
/// * `N` - Tree node handle
/// * `M` - Metric used for every priority computation
pub struct SchedulerDaemon<T, N: TreeNode, M> {
    /// The owned queue.
    queue: DualTreeTaskQueue<T, N>,
    /// Metric applied to push and unlock operations.
    metric: M,
    /// Channel receiver for queue operations.
    request_rx: mpsc::Receiver<SchedulerRequest<T, N>>,
}

impl<T, N, M> SchedulerDaemon<T, N, M>
where
    T: Clone + Send + 'static,
    N: TreeNode + Send + 'static,
    M: Metric<N::Bound> + Send + 'static,
{
    /// Create a daemon and the first client handle to it.
    ///
    /// The queue is initialized from the query table's frontier at
    /// `config.max_subtree_size`; the cache handle is passed straight
    /// through to the queue.
    pub fn new<Q>(
        config: SchedulerConfig,
        query_table: &Q,
        metric: M,
        cache: Arc<dyn ReferenceCache>,
    ) -> (Self, SchedulerClient<T, N>)
    where
        Q: QueryTable<Node = N>,
    {
        let (request_tx, request_rx) = mpsc::channel(config.channel_capacity);
        let queue = DualTreeTaskQueue::new(query_table, config.max_subtree_size, cache);

        let daemon = Self {
            queue,
            metric,
            request_rx,
        };
        (daemon, SchedulerClient::new(request_tx))
    }

    /// Shared handle to the queue's lifetime counters.
    pub fn stats(&self) -> Arc<QueueStats> {
        self.queue.stats()
    }

    /// Run until shutdown is signalled or every client is dropped.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(slots = self.queue.size(), "scheduler daemon starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("scheduler daemon shutting down");
                    break;
                }

                request = self.request_rx.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => {
                        info!("all scheduler clients dropped");
                        break;
                    }
                }
            }
        }

        info!("scheduler daemon stopped");
    }

    fn handle_request(&mut self, request: SchedulerRequest<T, N>) {
        match request {
            SchedulerRequest::Push { slot, binding } => {
                if let Err(err) = self.queue.push(&self.metric, slot, binding) {
                    warn!(%err, "push rejected");
                }
            }
            SchedulerRequest::Dequeue {
                slot,
                lock_on_take,
                reply,
            } => {
                let result = match self.queue.dequeue(slot, lock_on_take) {
                    Ok(result) => result,
                    Err(err) => {
                        warn!(%err, "dequeue rejected");
                        None
                    }
                };
                let _ = reply.send(result);
            }
            SchedulerRequest::Unlock { slot } => {
                if let Err(err) = self.queue.unlock(&self.metric, slot) {
                    warn!(%err, "unlock rejected");
                }
            }
            SchedulerRequest::RequestSplit => self.queue.request_split(),
            SchedulerRequest::Status { reply } => {
                let _ = reply.send(SchedulerStatus {
                    slots: self.queue.size(),
                    remaining_tasks: self.queue.remaining_tasks(),
                });
            }
        }
    }
}
