//! Editor configuration.
//!
//! Stored as JSON; every field has a default so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ImavidError, Result};
use crate::time::FrameRate;

/// Longest edge of preview thumbnails, in pixels.
pub const DEFAULT_PREVIEW_MAX_DIMENSION: u32 = 600;

/// Frame rate assumed when a decoder reports none.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Settings shared by the image and video sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Previews are shrunk to fit a square of this size.
    pub preview_max_dimension: u32,
    /// Fallback frame rate for clips without one.
    pub default_frame_rate: f64,
    /// Maximum undo snapshots per session. `None` keeps everything.
    pub history_depth: Option<usize>,
    /// Stop playback before applying a video effect.
    pub pause_on_effect: bool,
    /// Thumbnail frames during playback as well as for previews.
    pub playback_preview: bool,
    /// ffmpeg executable used for encoding.
    pub ffmpeg: String,
    /// ffmpeg video encoder for saved clips.
    pub video_codec: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            preview_max_dimension: DEFAULT_PREVIEW_MAX_DIMENSION,
            default_frame_rate: DEFAULT_FRAME_RATE,
            history_depth: None,
            pause_on_effect: true,
            playback_preview: true,
            ffmpeg: "ffmpeg".to_string(),
            video_codec: "mpeg4".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| ImavidError::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ImavidError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Load from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    /// Save to a file path.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.preview_max_dimension == 0 {
            return Err(ImavidError::Config(
                "preview_max_dimension must be at least 1".into(),
            ));
        }
        if FrameRate::from_fps_f64(self.default_frame_rate).is_none() {
            return Err(ImavidError::Config(format!(
                "default_frame_rate must be positive, got {}",
                self.default_frame_rate
            )));
        }
        if self.history_depth == Some(0) {
            return Err(ImavidError::Config(
                "history_depth must be at least 1".into(),
            ));
        }
        if self.ffmpeg.trim().is_empty() {
            return Err(ImavidError::Config("ffmpeg path is empty".into()));
        }
        Ok(())
    }

    /// The fallback frame rate as a [`FrameRate`].
    pub fn fallback_frame_rate(&self) -> FrameRate {
        FrameRate::from_fps_f64(self.default_frame_rate).unwrap_or_default()
    }

    /// Resolve a decoder-reported rate, falling back to the default.
    pub fn resolve_frame_rate(&self, reported: Option<f64>) -> FrameRate {
        reported
            .and_then(FrameRate::from_fps_f64)
            .unwrap_or_else(|| self.fallback_frame_rate())
    }
}
