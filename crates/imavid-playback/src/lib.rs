//! ImaVid Playback - background playback of frame sequences
//!
//! Architecture:
//! - `SequenceHandle`: shared slot holding the published sequence
//! - `PlaybackScheduler`: owns at most one worker thread that loops over the
//!   sequence and presents frames to a sink at the clip rate

pub mod handle;
pub mod scheduler;

pub use handle::SequenceHandle;
pub use scheduler::{PlaybackOptions, PlaybackScheduler, PlaybackState};
