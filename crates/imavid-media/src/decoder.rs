//! Video decoder using FFmpeg via ffmpeg-sidecar.

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use imavid_core::{ChannelLayout, Frame, ImavidError, MediaKind, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::format::MediaFormat;
use crate::{ClipDecoder, DecodedClip};

/// Whole-clip decoder.
///
/// Spawns FFmpeg as a subprocess that writes rgb24 raw frames to stdout, so
/// no FFmpeg development headers are needed.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: PathBuf,
}

impl FfmpegDecoder {
    /// Decoder running the given ffmpeg executable.
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Path of the ffmpeg executable.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl ClipDecoder for FfmpegDecoder {
    fn decode_clip(&self, path: &Path) -> Result<DecodedClip> {
        MediaFormat::from_path(path, MediaKind::Video)?;
        if !path.is_file() {
            return Err(ImavidError::Decode(format!(
                "File not found: {}",
                path.display()
            )));
        }

        info!("Decoding video file: {}", path.display());

        let mut child = FfmpegCommand::new_with_path(&self.ffmpeg)
            .input(path.to_string_lossy().as_ref())
            .rawvideo()
            .spawn()
            .map_err(|e| ImavidError::Decode(format!("Failed to spawn ffmpeg: {e}")))?;

        let events = child
            .iter()
            .map_err(|e| ImavidError::Decode(format!("Failed to read ffmpeg output: {e}")))?;

        let mut clip = DecodedClip::default();
        let mut last_error = None;

        for event in events {
            match event {
                FfmpegEvent::ParsedInputStream(stream) => {
                    if let Some(video) = stream.video_data() {
                        if clip.frame_rate.is_none() && video.fps > 0.0 {
                            clip.frame_rate = Some(video.fps as f64);
                        }
                    }
                }
                FfmpegEvent::OutputFrame(frame) => {
                    let frame = Frame::new(frame.width, frame.height, ChannelLayout::Rgb, frame.data)?;
                    clip.frames.push(frame);
                }
                FfmpegEvent::Error(e) => {
                    warn!("ffmpeg: {}", e);
                    last_error = Some(e);
                }
                _ => {}
            }
        }

        if let Err(e) = child.wait() {
            warn!("Failed to wait for ffmpeg: {}", e);
        }

        if clip.frames.is_empty() {
            if let Some(e) = last_error {
                return Err(ImavidError::Decode(e));
            }
        }

        debug!(
            frames = clip.frames.len(),
            fps = ?clip.frame_rate,
            "Decoded clip"
        );
        Ok(clip)
    }
}
