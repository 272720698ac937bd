//! Command scripts driven through the `Editor`.

use imavid_core::{EditorConfig, Frame, ImavidError, MediaKind, NullSink};
use imavid_effects::Effect;
use imavid_media::{ImageCodec, ImageFileCodec};
use imavid_session::{parse_script, Command, Editor};
use std::path::Path;
use std::sync::Arc;

use crate::support::{MemoryEncoder, StaticDecoder};

fn editor(encoder: Arc<MemoryEncoder>) -> Editor {
    Editor::with_backends(
        EditorConfig::default(),
        Arc::new(NullSink),
        Arc::new(ImageFileCodec::new()),
        Arc::new(StaticDecoder::bars(2, 40, 20, 10.0)),
        encoder,
    )
}

#[test]
fn video_script_saves_grayscale_clip() {
    let encoder = Arc::new(MemoryEncoder::default());
    let mut editor = editor(encoder.clone());
    let script = "\
# grayscale then shrink, then take the shrink back
load-video clip.mp4
apply-video-effect grayscale
apply-video-effect resize-smaller
undo-video
save-video out.mp4
";
    for command in parse_script(script).unwrap() {
        editor.execute(&command).unwrap();
    }

    let (path, saved) = encoder.last().unwrap();
    assert_eq!(path, Path::new("out.mp4"));
    assert_eq!(saved.len(), 2);
    let frame = saved.first().unwrap();
    assert_eq!(frame.dimensions(), (40, 20));
    assert!(frame.data().chunks(3).all(|px| px[0] == px[1] && px[1] == px[2]));
}

#[test]
fn image_script_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    ImageFileCodec::new()
        .write_image(&Frame::test_pattern(16, 16), &input)
        .unwrap();

    let mut editor = editor(Arc::new(MemoryEncoder::default()));
    let script = format!(
        "load-image {}\napply-image-effect sketch\napply-image-effect enhance-color 2\nsave-image {}\n",
        input.display(),
        output.display()
    );
    for command in parse_script(&script).unwrap() {
        editor.execute(&command).unwrap();
    }
    assert_eq!(
        ImageFileCodec::new().read_image(&output).unwrap().dimensions(),
        (16, 16)
    );
}

#[test]
fn commands_before_loading_report_errors() {
    let mut editor = editor(Arc::new(MemoryEncoder::default()));

    let err = editor.execute(&Command::UndoImage).unwrap_err();
    assert!(matches!(err, ImavidError::NoMediaLoaded(MediaKind::Image)));

    let err = editor
        .execute(&Command::ApplyVideoEffect {
            effect: Effect::Sharpen,
        })
        .unwrap_err();
    assert!(matches!(err, ImavidError::NoMediaLoaded(MediaKind::Video)));

    editor.execute(&Command::Play).unwrap();
    editor.execute(&Command::Pause).unwrap();
    editor.execute(&Command::Effects).unwrap();
}
