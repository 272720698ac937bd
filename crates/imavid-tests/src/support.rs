//! In-memory backends and sinks shared by the integration tests.

use imavid_core::{ChannelLayout, Frame, FrameSequence, FrameSink, ImavidError, Result};
use imavid_media::{ClipDecoder, ClipEncoder, DecodedClip};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Decoder returning the same frames for any path.
pub struct StaticDecoder {
    pub frames: Vec<Frame>,
    pub fps: Option<f64>,
}

impl StaticDecoder {
    /// `count` flat RGB frames whose sample value is their index.
    pub fn numbered(count: usize, width: u32, height: u32, fps: f64) -> Self {
        let frames = (0..count)
            .map(|i| Frame::filled(width, height, ChannelLayout::Rgb, i as u8))
            .collect();
        Self {
            frames,
            fps: Some(fps),
        }
    }

    /// `count` copies of the color-bar pattern.
    pub fn bars(count: usize, width: u32, height: u32, fps: f64) -> Self {
        Self {
            frames: vec![Frame::test_pattern(width, height); count],
            fps: Some(fps),
        }
    }
}

impl ClipDecoder for StaticDecoder {
    fn decode_clip(&self, path: &Path) -> Result<DecodedClip> {
        if path.as_os_str().is_empty() {
            return Err(ImavidError::Decode("empty path".into()));
        }
        Ok(DecodedClip {
            frames: self.frames.clone(),
            frame_rate: self.fps,
        })
    }
}

/// Encoder keeping every saved clip in memory.
#[derive(Default)]
pub struct MemoryEncoder {
    pub saved: Mutex<Vec<(PathBuf, FrameSequence)>>,
}

impl MemoryEncoder {
    pub fn last(&self) -> Option<(PathBuf, FrameSequence)> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl ClipEncoder for MemoryEncoder {
    fn encode_clip(&self, sequence: &FrameSequence, path: &Path) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((path.to_path_buf(), sequence.clone()));
        Ok(())
    }
}

/// Sink recording when each frame arrived.
#[derive(Default)]
pub struct RecordingSink {
    pub frames: Mutex<Vec<(Instant, Frame)>>,
    count: AtomicU64,
}

impl RecordingSink {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn stamps(&self) -> Vec<Instant> {
        self.frames.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl FrameSink for RecordingSink {
    fn present(&self, frame: &Frame) {
        self.frames
            .lock()
            .unwrap()
            .push((Instant::now(), frame.clone()));
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Poll `f` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    f()
}
