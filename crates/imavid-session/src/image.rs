//! Still-image edit session.

use imavid_core::{EditorConfig, Frame, FrameSink, ImavidError, MediaKind, Result};
use imavid_effects::Effect;
use imavid_media::ImageCodec;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::history::History;

/// One open image with its undo history.
///
/// The current image is the top of the history, so every applied effect is
/// exactly one `undo` away from the image it was applied to.
pub struct ImageSession {
    codec: Arc<dyn ImageCodec>,
    sink: Arc<dyn FrameSink>,
    config: EditorConfig,
    history: Option<History<Frame>>,
}

impl ImageSession {
    pub fn new(codec: Arc<dyn ImageCodec>, sink: Arc<dyn FrameSink>, config: EditorConfig) -> Self {
        Self {
            codec,
            sink,
            config,
            history: None,
        }
    }

    /// Open an image, replacing the current one and its history.
    ///
    /// On failure the previous image stays open.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let frame = self.codec.read_image(path)?;
        frame.validate()?;
        info!(
            "Opened image {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );
        self.preview(&frame);
        self.history = Some(History::with_max_depth(frame, self.config.history_depth));
        Ok(())
    }

    /// Write the current image; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let frame = self.require()?.current();
        self.codec.write_image(frame, path)
    }

    /// Apply `effect` to the current image and record the result.
    pub fn apply_effect(&mut self, effect: &Effect) -> Result<()> {
        let history = self
            .history
            .as_mut()
            .ok_or(ImavidError::NoMediaLoaded(MediaKind::Image))?;
        let next = effect.apply(history.current())?;
        info!(
            "Applied {} to image ({}x{} -> {}x{})",
            effect,
            history.current().width(),
            history.current().height(),
            next.width(),
            next.height()
        );
        history.push(next);
        self.preview_current();
        Ok(())
    }

    /// Return to the image before the last effect. At the loaded image this
    /// changes nothing.
    pub fn undo(&mut self) -> Result<()> {
        let history = self
            .history
            .as_mut()
            .ok_or(ImavidError::NoMediaLoaded(MediaKind::Image))?;
        if !history.can_undo() {
            info!("Nothing to undo");
        }
        history.undo();
        self.preview_current();
        Ok(())
    }

    /// The current image, if one is open.
    pub fn current(&self) -> Option<&Frame> {
        self.history.as_ref().map(History::current)
    }

    pub fn is_loaded(&self) -> bool {
        self.history.is_some()
    }

    /// Snapshots held, including the loaded image. Zero when nothing is open.
    pub fn history_len(&self) -> usize {
        self.history.as_ref().map_or(0, History::len)
    }

    fn require(&self) -> Result<&History<Frame>> {
        self.history
            .as_ref()
            .ok_or(ImavidError::NoMediaLoaded(MediaKind::Image))
    }

    fn preview_current(&self) {
        if let Some(frame) = self.current() {
            self.preview(frame);
        }
    }

    fn preview(&self, frame: &Frame) {
        self.sink
            .present(&frame.to_rgb().thumbnail(self.config.preview_max_dimension));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imavid_core::{ChannelLayout, LatestFrameSink};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryCodec {
        files: Mutex<HashMap<PathBuf, Frame>>,
    }

    impl ImageCodec for MemoryCodec {
        fn read_image(&self, path: &Path) -> Result<Frame> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| ImavidError::Decode(format!("no file {}", path.display())))
        }

        fn write_image(&self, frame: &Frame, path: &Path) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), frame.clone());
            Ok(())
        }
    }

    fn session_with(frame: Frame) -> (ImageSession, Arc<MemoryCodec>, Arc<LatestFrameSink>) {
        let codec = Arc::new(MemoryCodec::default());
        codec
            .files
            .lock()
            .unwrap()
            .insert(PathBuf::from("in.png"), frame);
        let sink = Arc::new(LatestFrameSink::new());
        let session = ImageSession::new(codec.clone(), sink.clone(), EditorConfig::default());
        (session, codec, sink)
    }

    #[test]
    fn test_operations_need_an_image() {
        let (mut session, _, _) = session_with(Frame::test_pattern(4, 4));
        let no_image = |r: Result<()>| matches!(r, Err(ImavidError::NoMediaLoaded(MediaKind::Image)));
        assert!(no_image(session.apply_effect(&Effect::Sharpen)));
        assert!(no_image(session.undo()));
        assert!(no_image(session.save(Path::new("out.png"))));
    }

    #[test]
    fn test_apply_then_undo_restores_original() {
        let original = Frame::test_pattern(40, 20);
        let (mut session, _, _) = session_with(original.clone());
        session.load(Path::new("in.png")).unwrap();

        session.apply_effect(&Effect::Grayscale).unwrap();
        assert_eq!(session.current().unwrap().layout(), ChannelLayout::Gray);
        session.apply_effect(&Effect::Resize { scale: 0.5 }).unwrap();
        assert_eq!(session.current().unwrap().dimensions(), (20, 10));
        assert_eq!(session.history_len(), 3);

        session.undo().unwrap();
        assert_eq!(session.current().unwrap().dimensions(), (40, 20));
        session.undo().unwrap();
        assert_eq!(session.current().unwrap(), &original);
        session.undo().unwrap();
        assert_eq!(session.current().unwrap(), &original);
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let (mut session, _, _) = session_with(Frame::test_pattern(8, 8));
        session.load(Path::new("in.png")).unwrap();
        session.apply_effect(&Effect::Sharpen).unwrap();

        assert!(session.load(Path::new("missing.png")).is_err());
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn test_failed_effect_records_nothing() {
        let (mut session, _, _) = session_with(Frame::test_pattern(8, 8));
        session.load(Path::new("in.png")).unwrap();
        assert!(session.apply_effect(&Effect::Resize { scale: -1.0 }).is_err());
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_preview_is_thumbnailed_rgb() {
        let (mut session, _, sink) = session_with(Frame::test_pattern(1200, 600));
        session.load(Path::new("in.png")).unwrap();
        assert_eq!(sink.latest().unwrap().dimensions(), (600, 300));

        session.apply_effect(&Effect::Grayscale).unwrap();
        let shown = sink.latest().unwrap();
        assert_eq!(shown.layout(), ChannelLayout::Rgb);
        assert_eq!(sink.presented(), 2);
    }

    #[test]
    fn test_save_writes_current_image() {
        let (mut session, codec, _) = session_with(Frame::test_pattern(8, 8));
        session.load(Path::new("in.png")).unwrap();
        session.apply_effect(&Effect::Grayscale).unwrap();
        session.save(Path::new("out.png")).unwrap();

        let files = codec.files.lock().unwrap();
        assert_eq!(files.get(Path::new("out.png")), session.current());
    }

    #[test]
    fn test_history_depth_from_config() {
        let codec = Arc::new(MemoryCodec::default());
        codec
            .files
            .lock()
            .unwrap()
            .insert(PathBuf::from("in.png"), Frame::test_pattern(8, 8));
        let config = EditorConfig {
            history_depth: Some(2),
            ..Default::default()
        };
        let mut session = ImageSession::new(codec, Arc::new(LatestFrameSink::new()), config);
        session.load(Path::new("in.png")).unwrap();
        for _ in 0..4 {
            session.apply_effect(&Effect::Sharpen).unwrap();
        }
        assert_eq!(session.history_len(), 2);
    }
}
