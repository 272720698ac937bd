//! Snapshot-based undo history.

use std::collections::VecDeque;

/// Stack of owned snapshots whose top is the current state.
///
/// The first snapshot is the base: `undo` never removes it. With a depth
/// bound the oldest snapshot is dropped once the bound is exceeded and the
/// next oldest becomes the base.
#[derive(Debug, Clone)]
pub struct History<S> {
    snapshots: VecDeque<S>,
    max_depth: Option<usize>,
}

impl<S> History<S> {
    /// Unbounded history holding only `initial`.
    pub fn new(initial: S) -> Self {
        Self::with_max_depth(initial, None)
    }

    /// History keeping at most `max_depth` snapshots (at least 1).
    pub fn with_max_depth(initial: S, max_depth: Option<usize>) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            max_depth: max_depth.map(|n| n.max(1)),
        }
    }

    /// Record a new current state.
    pub fn push(&mut self, snapshot: S) {
        self.snapshots.push_back(snapshot);
        if let Some(max) = self.max_depth {
            while self.snapshots.len() > max {
                self.snapshots.pop_front();
            }
        }
    }

    /// Step back one snapshot and return the new current state.
    ///
    /// At the base this changes nothing and returns the base.
    pub fn undo(&mut self) -> &S {
        if self.snapshots.len() > 1 {
            self.snapshots.pop_back();
        }
        self.current()
    }

    /// The current state.
    pub fn current(&self) -> &S {
        // never empty: construction pushes one snapshot and `undo` keeps it
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// The oldest retained snapshot.
    pub fn base(&self) -> &S {
        &self.snapshots[0]
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Never true: the base snapshot is always retained.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// True when `undo` would change the current state.
    pub fn can_undo(&self) -> bool {
        self.snapshots.len() > 1
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}
