//! ImaVid Media - decoding, encoding and still-image I/O
//!
//! This crate handles:
//! - Whole-clip video decoding through an FFmpeg sidecar process
//! - Encoding frame sequences by piping raw frames into FFmpeg
//! - PNG/JPEG reading and writing
//!
//! Sessions only see the [`ClipDecoder`], [`ClipEncoder`] and [`ImageCodec`]
//! traits, so tests can swap in in-memory implementations.

pub mod decoder;
pub mod export;
pub mod format;
pub mod image_io;

pub use decoder::FfmpegDecoder;
pub use export::{EncodeSettings, FfmpegEncoder};
pub use format::{MediaFormat, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
pub use image_io::ImageFileCodec;

use imavid_core::{Frame, FrameSequence, Result};
use std::path::Path;

/// Every frame of a clip plus the rate the container reported.
#[derive(Debug, Clone, Default)]
pub struct DecodedClip {
    pub frames: Vec<Frame>,
    /// Frames per second, when the decoder found one.
    pub frame_rate: Option<f64>,
}

/// Reads a whole video clip into memory.
pub trait ClipDecoder: Send + Sync {
    fn decode_clip(&self, path: &Path) -> Result<DecodedClip>;
}

/// Writes a frame sequence as a video file.
pub trait ClipEncoder: Send + Sync {
    fn encode_clip(&self, sequence: &FrameSequence, path: &Path) -> Result<()>;
}

/// Reads and writes still images.
pub trait ImageCodec: Send + Sync {
    fn read_image(&self, path: &Path) -> Result<Frame>;
    fn write_image(&self, frame: &Frame, path: &Path) -> Result<()>;
}

/// True when an `ffmpeg` binary can be run from `PATH`.
pub fn ffmpeg_available() -> bool {
    ffmpeg_sidecar::command::ffmpeg_is_installed()
}
