//! Ordered, in-memory frame sequences.
//!
//! A sequence is the full state of one clip: every decoded frame plus the
//! clip frame rate. Once built it is never modified; transforms produce a new
//! sequence, which lets the playback worker keep reading an older one safely.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{ImavidError, Result};
use crate::frame::Frame;
use crate::time::FrameRate;

/// An ordered list of frames and the rate they play at.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    frame_rate: FrameRate,
}

impl FrameSequence {
    /// Build a sequence from decoded frames.
    ///
    /// Fails with `EmptySequence` when `frames` is empty and
    /// `InvalidParameter` when the rate has a zero term.
    pub fn load(frames: Vec<Frame>, frame_rate: FrameRate) -> Result<Self> {
        if frames.is_empty() {
            return Err(ImavidError::EmptySequence);
        }
        check_rate(frame_rate)?;
        Ok(Self { frames, frame_rate })
    }

    /// Apply `f` to every frame, producing a sequence of equal length.
    ///
    /// Frames are processed on the rayon pool; the output keeps the input
    /// order. The first error aborts the whole map and nothing partial is
    /// returned.
    pub fn map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Frame) -> Result<Frame> + Sync,
    {
        debug!(frames = self.frames.len(), "Mapping frame sequence");
        let frames = self
            .frames
            .par_iter()
            .map(|frame| f(frame))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            frames,
            frame_rate: self.frame_rate,
        })
    }

    /// First frame, for previews.
    pub fn first(&self) -> Result<&Frame> {
        self.frames.first().ok_or(ImavidError::EmptySequence)
    }

    /// Frame at `index`.
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// All frames in temporal order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Same frames, different rate.
    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Result<Self> {
        check_rate(frame_rate)?;
        self.frame_rate = frame_rate;
        Ok(self)
    }

    /// Total pixel memory held by the sequence.
    pub fn memory_size(&self) -> usize {
        self.frames.iter().map(Frame::memory_size).sum()
    }
}

fn check_rate(frame_rate: FrameRate) -> Result<()> {
    if frame_rate.is_valid() {
        Ok(())
    } else {
        Err(ImavidError::InvalidParameter(format!(
            "frame rate {}/{} is not playable",
            frame_rate.numerator, frame_rate.denominator
        )))
    }
}
