//! Encoding frame sequences to video files.
//!
//! Frames are piped as rgb24 raw video into an FFmpeg child process.

use imavid_core::{Frame, FrameRate, FrameSequence, ImavidError, MediaKind, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

use crate::format::MediaFormat;
use crate::ClipEncoder;

/// Encoder settings shared by every clip written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeSettings {
    /// ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// FFmpeg encoder name.
    pub video_codec: String,
    /// Output pixel format.
    pub pixel_format: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            video_codec: "mpeg4".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

impl EncodeSettings {
    /// Build the FFmpeg command arguments for one clip.
    pub fn ffmpeg_args(
        &self,
        width: u32,
        height: u32,
        frame_rate: FrameRate,
        format: MediaFormat,
        output: &Path,
    ) -> Vec<String> {
        let mut args = Vec::new();

        // Input from pipe (raw frames)
        args.extend_from_slice(&[
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pixel_format".into(),
            "rgb24".into(),
            "-video_size".into(),
            format!("{}x{}", width, height),
            "-framerate".into(),
            format!("{}/{}", frame_rate.numerator, frame_rate.denominator),
            "-i".into(),
            "pipe:0".into(),
        ]);

        args.extend_from_slice(&["-c:v".into(), self.video_codec.clone()]);

        // 4:2:0 chroma needs even dimensions
        if (width % 2 != 0 || height % 2 != 0) && self.pixel_format == "yuv420p" {
            args.extend_from_slice(&["-vf".into(), "pad=ceil(iw/2)*2:ceil(ih/2)*2".into()]);
        }

        args.extend_from_slice(&["-pix_fmt".into(), self.pixel_format.clone()]);

        if let Some(muxer) = format.ffmpeg_muxer() {
            args.extend_from_slice(&["-f".into(), muxer.into()]);
        }

        args.push(output.to_string_lossy().into_owned());
        args
    }
}

/// Writes clips with an FFmpeg child process.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoder {
    settings: EncodeSettings,
}

impl FfmpegEncoder {
    pub fn new(settings: EncodeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }
}

/// `frame` as rgb24 at exactly `width x height`.
fn conform(frame: &Frame, width: u32, height: u32) -> Cow<'_, Frame> {
    let rgb = frame.to_rgb();
    if rgb.dimensions() == (width, height) {
        rgb
    } else {
        Cow::Owned(rgb.resized(width, height))
    }
}

impl ClipEncoder for FfmpegEncoder {
    fn encode_clip(&self, sequence: &FrameSequence, path: &Path) -> Result<()> {
        let format = MediaFormat::from_path(path, MediaKind::Video)?;
        let first = sequence.first()?;
        first.validate()?;
        let (width, height) = first.dimensions();

        let args = self.settings.ffmpeg_args(
            width,
            height,
            sequence.frame_rate(),
            format,
            path,
        );
        debug!("ffmpeg {}", args.join(" "));

        let mut child = Command::new(&self.settings.ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ImavidError::Encode(format!("Failed to spawn ffmpeg: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ImavidError::Encode("Failed to open ffmpeg stdin".into()))?;

        let start_time = Instant::now();

        for (index, frame) in sequence.frames().iter().enumerate() {
            let frame = conform(frame, width, height);
            if let Err(e) = stdin.write_all(frame.data()) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ImavidError::Encode(format!(
                    "Failed to write frame {index}: {e}"
                )));
            }
        }

        // Close stdin to signal end-of-stream
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| ImavidError::Encode(format!("Failed to wait for ffmpeg: {e}")))?;

        if !status.success() {
            return Err(ImavidError::Encode(format!(
                "ffmpeg exited with status: {}",
                status
            )));
        }

        info!(
            "Saved {} frames to {} in {:.2?}",
            sequence.len(),
            path.display(),
            start_time.elapsed()
        );
        Ok(())
    }
}
