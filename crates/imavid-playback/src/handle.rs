//! Shared reference to the current frame sequence.

use imavid_core::FrameSequence;
use parking_lot::RwLock;
use std::sync::Arc;

/// Slot through which a session publishes its sequence to playback.
///
/// Sequences are immutable, so publishing swaps the whole `Arc`. Readers
/// take a snapshot and iterate it without holding the lock; a snapshot
/// stays valid after a newer sequence is published.
#[derive(Debug, Clone, Default)]
pub struct SequenceHandle {
    slot: Arc<RwLock<Option<Arc<FrameSequence>>>>,
}

impl SequenceHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published sequence.
    pub fn publish(&self, sequence: Arc<FrameSequence>) {
        *self.slot.write() = Some(sequence);
    }

    /// Withdraw the published sequence.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// The currently published sequence.
    pub fn snapshot(&self) -> Option<Arc<FrameSequence>> {
        self.slot.read().clone()
    }

    pub fn is_published(&self) -> bool {
        self.slot.read().is_some()
    }
}
