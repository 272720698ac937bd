//! ImaVid Core - Foundation types for image and video editing
//!
//! This crate provides the fundamental types used throughout ImaVid:
//! - Frames and channel layouts
//! - Frame sequences and frame rates
//! - Display sinks
//! - Editor configuration and errors

pub mod config;
pub mod error;
pub mod frame;
pub mod sequence;
pub mod sink;
pub mod time;

pub use config::EditorConfig;
pub use error::{ImavidError, MediaKind, Result};
pub use frame::{ChannelLayout, Frame};
pub use sequence::FrameSequence;
pub use sink::{FrameSink, LatestFrameSink, NullSink};
pub use time::FrameRate;

/// Number of channels every frame in a stored sequence is expanded to.
pub const NOMINAL_CHANNELS: usize = 3;
