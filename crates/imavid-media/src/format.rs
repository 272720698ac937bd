//! File-extension based format selection.

use imavid_core::{ImavidError, MediaKind, Result};
use std::path::Path;

/// Extensions accepted for still images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extensions accepted for video clips, both ways.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

/// A container or image format picked from a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Mp4,
    Avi,
    Mov,
}

impl MediaFormat {
    /// Pick the format of `path` for the given medium.
    ///
    /// The extension is matched case-insensitively; anything outside the
    /// medium's list is `UnsupportedFormat`.
    pub fn from_path(path: &Path, kind: MediaKind) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let format = match (kind, ext.as_str()) {
            (MediaKind::Image, "png") => Self::Png,
            (MediaKind::Image, "jpg" | "jpeg") => Self::Jpeg,
            (MediaKind::Video, "mp4") => Self::Mp4,
            (MediaKind::Video, "avi") => Self::Avi,
            (MediaKind::Video, "mov") => Self::Mov,
            _ => {
                let accepted = match kind {
                    MediaKind::Image => IMAGE_EXTENSIONS,
                    MediaKind::Video => VIDEO_EXTENSIONS,
                };
                return Err(ImavidError::UnsupportedFormat(format!(
                    "{} '{}' (expected one of: {})",
                    kind,
                    path.display(),
                    accepted.join(", ")
                )));
            }
        };
        Ok(format)
    }

    /// FFmpeg muxer name for video formats.
    pub fn ffmpeg_muxer(self) -> Option<&'static str> {
        match self {
            Self::Mp4 => Some("mp4"),
            Self::Avi => Some("avi"),
            Self::Mov => Some("mov"),
            Self::Png | Self::Jpeg => None,
        }
    }
}
