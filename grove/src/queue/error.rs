//! Error types for the scheduling core.

use thiserror::Error;

use super::registry::SlotId;

/// Precondition violations at the queue boundary.
///
/// These indicate caller bugs, not runtime conditions; the queue's state is
/// left untouched when one is returned. An empty or held slot is *not* an
/// error — dequeue signals that case with `Ok(None)`.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A slot index outside the registry was passed to a queue operation.
    #[error("slot index {slot} out of range (registry holds {slots} slots)")]
    SlotOutOfRange {
        /// The offending index.
        slot: SlotId,
        /// Registry length at the time of the call.
        slots: usize,
    },
}
