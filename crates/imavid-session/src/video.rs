//! Video edit session: the clip in memory, its history and playback.

use imavid_core::{EditorConfig, Frame, FrameSequence, FrameSink, ImavidError, MediaKind, Result};
use imavid_effects::Effect;
use imavid_media::{ClipDecoder, ClipEncoder};
use imavid_playback::{PlaybackOptions, PlaybackScheduler, PlaybackState, SequenceHandle};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::history::History;

/// One open clip.
///
/// Sequences are shared as `Arc`s: history snapshots, the playback worker
/// and the current state all point at immutable sequences, and every edit
/// publishes a new one.
pub struct VideoSession {
    decoder: Arc<dyn ClipDecoder>,
    encoder: Arc<dyn ClipEncoder>,
    sink: Arc<dyn FrameSink>,
    config: EditorConfig,
    handle: SequenceHandle,
    history: Option<History<Arc<FrameSequence>>>,
    playback: PlaybackScheduler,
}

impl VideoSession {
    pub fn new(
        decoder: Arc<dyn ClipDecoder>,
        encoder: Arc<dyn ClipEncoder>,
        sink: Arc<dyn FrameSink>,
        config: EditorConfig,
    ) -> Self {
        let handle = SequenceHandle::new();
        let playback = PlaybackScheduler::new(
            handle.clone(),
            Arc::clone(&sink),
            PlaybackOptions::from_config(&config),
        );
        Self {
            decoder,
            encoder,
            sink,
            config,
            handle,
            history: None,
            playback,
        }
    }

    /// Decode a whole clip, replacing the current one and its history.
    ///
    /// A clip without frames is `EmptySequence`; on any failure the previous
    /// clip stays open.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let start = Instant::now();
        let clip = self.decoder.decode_clip(path)?;
        let frame_rate = self.config.resolve_frame_rate(clip.frame_rate);
        for frame in &clip.frames {
            frame.validate()?;
        }
        let frames = clip.frames.into_iter().map(Frame::into_rgb).collect();
        let sequence = Arc::new(FrameSequence::load(frames, frame_rate)?);

        info!(
            "Opened video {} ({} frames @ {}) in {:.2?}",
            path.display(),
            sequence.len(),
            frame_rate,
            start.elapsed()
        );

        self.history = Some(History::with_max_depth(
            Arc::clone(&sequence),
            self.config.history_depth,
        ));
        self.handle.publish(Arc::clone(&sequence));
        self.preview(&sequence);
        Ok(())
    }

    /// Apply `effect` to every frame and record the new clip.
    ///
    /// Single-channel results are expanded back to RGB. Playback is paused
    /// first unless `pause_on_effect` is off; an effect with bad constants
    /// is rejected before playback is touched.
    pub fn apply_effect(&mut self, effect: &Effect) -> Result<()> {
        if self.history.is_none() {
            return Err(ImavidError::NoMediaLoaded(MediaKind::Video));
        }
        effect.validate()?;
        if self.config.pause_on_effect {
            self.playback.pause();
        }

        let history = self
            .history
            .as_mut()
            .ok_or(ImavidError::NoMediaLoaded(MediaKind::Video))?;
        let start = Instant::now();
        let next = history
            .current()
            .map(|frame| effect.apply(frame).map(Frame::into_rgb))?;
        let next = Arc::new(next);
        info!(
            "Applied {} to {} frames in {:.2?}",
            effect,
            next.len(),
            start.elapsed()
        );

        history.push(Arc::clone(&next));
        self.handle.publish(Arc::clone(&next));
        self.preview(&next);
        Ok(())
    }

    /// Return to the clip before the last effect. Playback keeps running and
    /// picks up the restored clip on its next lap.
    pub fn undo(&mut self) -> Result<()> {
        let history = self
            .history
            .as_mut()
            .ok_or(ImavidError::NoMediaLoaded(MediaKind::Video))?;
        if !history.can_undo() {
            info!("Nothing to undo");
        }
        let current = Arc::clone(history.undo());
        debug!(history = history.len(), "Undo video");
        self.handle.publish(Arc::clone(&current));
        self.preview(&current);
        Ok(())
    }

    /// Encode the current clip.
    pub fn save(&self, path: &Path) -> Result<()> {
        let sequence = self
            .current()
            .ok_or(ImavidError::NoMediaLoaded(MediaKind::Video))?;
        self.encoder.encode_clip(&sequence, path)
    }

    /// Start looping playback. Does nothing without a clip.
    pub fn play(&self) {
        if self.history.is_none() {
            debug!("No video to play");
            return;
        }
        self.playback.play();
    }

    pub fn pause(&self) {
        self.playback.pause();
    }

    /// Restart playback from the first frame.
    pub fn resume(&self) {
        if self.history.is_none() {
            debug!("No video to resume");
            return;
        }
        self.playback.resume();
    }

    /// The current clip, if one is open.
    pub fn current(&self) -> Option<Arc<FrameSequence>> {
        self.history.as_ref().map(|h| Arc::clone(h.current()))
    }

    pub fn is_loaded(&self) -> bool {
        self.history.is_some()
    }

    pub fn history_len(&self) -> usize {
        self.history.as_ref().map_or(0, History::len)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Frames shown by playback so far.
    pub fn frames_presented(&self) -> u64 {
        self.playback.frames_presented()
    }

    fn preview(&self, sequence: &FrameSequence) {
        if let Ok(frame) = sequence.first() {
            self.sink
                .present(&frame.to_rgb().thumbnail(self.config.preview_max_dimension));
        }
    }
}
