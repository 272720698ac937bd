//! Display sinks: where previews and playback frames end up.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::frame::Frame;

/// A consumer that renders frames for viewing.
///
/// Called from the foreground control path for previews and from the
/// playback worker during playback, so implementations must be thread-safe
/// and should return quickly.
pub trait FrameSink: Send + Sync {
    /// Show `frame`, replacing whatever was shown before.
    fn present(&self, frame: &Frame);
}

/// Sink that keeps only the most recent frame.
#[derive(Debug, Default)]
pub struct LatestFrameSink {
    latest: Mutex<Option<Frame>>,
    presented: AtomicU64,
}

impl LatestFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented frame, if any.
    pub fn latest(&self) -> Option<Frame> {
        self.latest.lock().clone()
    }

    /// How many frames have been presented so far.
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }
}

impl FrameSink for LatestFrameSink {
    fn present(&self, frame: &Frame) {
        *self.latest.lock() = Some(frame.clone());
        self.presented.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&self, _frame: &Frame) {}
}
