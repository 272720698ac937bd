//! Integration tests for still-image editing through the real codec.

use imavid_core::{ChannelLayout, EditorConfig, Frame, ImavidError, LatestFrameSink};
use imavid_effects::Effect;
use imavid_media::{ImageCodec, ImageFileCodec};
use imavid_session::ImageSession;
use std::sync::Arc;

fn session() -> (ImageSession, Arc<LatestFrameSink>) {
    let sink = Arc::new(LatestFrameSink::new());
    let session = ImageSession::new(
        Arc::new(ImageFileCodec::new()),
        sink.clone(),
        EditorConfig::default(),
    );
    (session, sink)
}

#[test]
fn edit_save_and_reload_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bars.png");
    let output = dir.path().join("gray.png");
    let codec = ImageFileCodec::new();
    codec.write_image(&Frame::test_pattern(64, 32), &input).unwrap();

    let (mut session, sink) = session();
    session.load(&input).unwrap();
    session.apply_effect(&Effect::Grayscale).unwrap();
    session.save(&output).unwrap();

    let saved = codec.read_image(&output).unwrap();
    assert_eq!(saved.layout(), ChannelLayout::Gray);
    assert_eq!(&saved, session.current().unwrap());
    assert_eq!(sink.presented(), 2);
}

#[test]
fn undo_then_save_writes_original() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    let codec = ImageFileCodec::new();
    let original = Frame::test_pattern(30, 20);
    codec.write_image(&original, &input).unwrap();

    let (mut session, _) = session();
    session.load(&input).unwrap();
    session.apply_effect(&Effect::Cartoonize).unwrap();
    session.apply_effect(&Effect::Resize { scale: 1.5 }).unwrap();
    assert_eq!(session.current().unwrap().dimensions(), (45, 30));
    session.undo().unwrap();
    session.undo().unwrap();
    session.save(&output).unwrap();

    assert_eq!(codec.read_image(&output).unwrap(), original);
}

#[test]
fn unsupported_extensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    ImageFileCodec::new()
        .write_image(&Frame::test_pattern(8, 8), &input)
        .unwrap();

    let (mut session, _) = session();
    assert!(matches!(
        session.load(&dir.path().join("in.tiff")),
        Err(ImavidError::UnsupportedFormat(_))
    ));
    session.load(&input).unwrap();
    assert!(matches!(
        session.save(&dir.path().join("out.bmp")),
        Err(ImavidError::UnsupportedFormat(_))
    ));
}

#[test]
fn large_image_preview_fits_box() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("wide.jpg");
    ImageFileCodec::new()
        .write_image(&Frame::test_pattern(1500, 500), &input)
        .unwrap();

    let (mut session, sink) = session();
    session.load(&input).unwrap();
    assert_eq!(sink.latest().unwrap().dimensions(), (600, 200));
    assert_eq!(session.current().unwrap().dimensions(), (1500, 500));
}
