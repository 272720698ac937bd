//! Integration tests for the video editing core.
//!
//! Exercises imavid-session's `VideoSession` together with the effects
//! library and the playback scheduler.

use imavid_core::{ChannelLayout, EditorConfig, Frame, FrameRate, ImavidError, MediaKind};
use imavid_effects::Effect;
use imavid_playback::PlaybackState;
use imavid_session::VideoSession;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::support::{wait_until, MemoryEncoder, RecordingSink, StaticDecoder};

// ── Helpers ────────────────────────────────────────────────────

struct Rig {
    session: VideoSession,
    sink: Arc<RecordingSink>,
    encoder: Arc<MemoryEncoder>,
}

fn rig(decoder: StaticDecoder, config: EditorConfig) -> Rig {
    let sink = Arc::new(RecordingSink::default());
    let encoder = Arc::new(MemoryEncoder::default());
    let session = VideoSession::new(Arc::new(decoder), encoder.clone(), sink.clone(), config);
    Rig {
        session,
        sink,
        encoder,
    }
}

fn loaded(decoder: StaticDecoder) -> Rig {
    let mut rig = rig(decoder, EditorConfig::default());
    rig.session.load(Path::new("clip.mp4")).unwrap();
    rig
}

// ── Loading ────────────────────────────────────────────────────

#[test]
fn empty_clip_leaves_session_empty() {
    let mut rig = rig(
        StaticDecoder {
            frames: Vec::new(),
            fps: Some(30.0),
        },
        EditorConfig::default(),
    );
    let err = rig.session.load(Path::new("empty.mp4")).unwrap_err();
    assert!(matches!(err, ImavidError::EmptySequence));
    assert!(rig.session.current().is_none());
    assert!(matches!(
        rig.session.apply_effect(&Effect::Grayscale),
        Err(ImavidError::NoMediaLoaded(MediaKind::Video))
    ));
    assert_eq!(rig.sink.count(), 0);
}

#[test]
fn load_previews_first_frame() {
    let rig = loaded(StaticDecoder::bars(3, 1280, 720, 25.0));
    assert_eq!(rig.sink.count(), 1);
    let (_, shown) = rig.sink.frames.lock().unwrap()[0].clone();
    assert_eq!(shown.dimensions(), (600, 338));
    assert_eq!(
        rig.session.current().unwrap().frame_rate(),
        FrameRate::FPS_25
    );
}

// ── Effects & history ──────────────────────────────────────────

#[test]
fn effect_chain_then_undo_yields_first_effect_output() {
    let mut rig = loaded(StaticDecoder::bars(2, 64, 32, 10.0));
    let original = rig.session.current().unwrap();
    let gray_only = original
        .map(|f| Effect::Grayscale.apply(f).map(Frame::into_rgb))
        .unwrap();

    rig.session.apply_effect(&Effect::Grayscale).unwrap();
    rig.session
        .apply_effect(&Effect::Resize { scale: 0.5 })
        .unwrap();
    let resized = rig.session.current().unwrap();
    assert_eq!(resized.first().unwrap().dimensions(), (32, 16));

    rig.session.undo().unwrap();
    assert_eq!(*rig.session.current().unwrap(), gray_only);

    rig.session.undo().unwrap();
    assert_eq!(*rig.session.current().unwrap(), *original);
}

#[test]
fn undo_round_trip_is_bit_identical_for_every_effect() {
    let mut rig = loaded(StaticDecoder::bars(2, 24, 12, 30.0));
    let before = rig.session.current().unwrap();
    for preset in imavid_effects::PRESETS {
        rig.session.apply_effect(&preset.effect).unwrap();
        rig.session.undo().unwrap();
        assert_eq!(*rig.session.current().unwrap(), *before, "{}", preset.name);
    }
}

#[test]
fn repeated_undo_keeps_loaded_clip() {
    let mut rig = loaded(StaticDecoder::bars(1, 8, 8, 30.0));
    let base = rig.session.current().unwrap();
    rig.session.apply_effect(&Effect::Sharpen).unwrap();
    for _ in 0..5 {
        rig.session.undo().unwrap();
    }
    assert_eq!(rig.session.history_len(), 1);
    assert!(Arc::ptr_eq(&rig.session.current().unwrap(), &base));
}

#[test]
fn map_preserves_frame_order() {
    let mut rig = loaded(StaticDecoder::numbered(64, 4, 4, 30.0));
    rig.session.apply_effect(&Effect::Grayscale).unwrap();
    let current = rig.session.current().unwrap();
    for (i, frame) in current.frames().iter().enumerate() {
        assert_eq!(frame.layout(), ChannelLayout::Rgb);
        assert_eq!(frame.data()[0], i as u8);
    }
}

#[test]
fn grayscale_twice_equals_once() {
    let mut rig = loaded(StaticDecoder::bars(2, 16, 8, 30.0));
    rig.session.apply_effect(&Effect::Grayscale).unwrap();
    let once = rig.session.current().unwrap();
    rig.session.apply_effect(&Effect::Grayscale).unwrap();
    assert_eq!(*rig.session.current().unwrap(), *once);
}

#[test]
fn failed_effect_keeps_state() {
    let mut rig = loaded(StaticDecoder::bars(2, 16, 8, 30.0));
    let before = rig.session.current().unwrap();
    let err = rig
        .session
        .apply_effect(&Effect::EnhanceColor { factor: f32::NAN })
        .unwrap_err();
    assert!(matches!(err, ImavidError::InvalidParameter(_)));
    assert!(Arc::ptr_eq(&rig.session.current().unwrap(), &before));
    assert_eq!(rig.session.history_len(), 1);
}

#[test]
fn save_encodes_current_clip() {
    let mut rig = loaded(StaticDecoder::bars(3, 20, 10, 24.0));
    rig.session.apply_effect(&Effect::Sketch).unwrap();
    rig.session.save(Path::new("out.mp4")).unwrap();

    let (path, saved) = rig.encoder.last().unwrap();
    assert_eq!(path, Path::new("out.mp4"));
    assert_eq!(saved, *rig.session.current().unwrap());
    assert_eq!(saved.frame_rate(), FrameRate::FPS_24);
}

// ── Playback ───────────────────────────────────────────────────

#[test]
fn playback_spaces_frames_by_rate() {
    let rig = loaded(StaticDecoder::bars(4, 16, 16, 25.0));
    rig.session.play();
    assert!(wait_until(Duration::from_secs(3), || rig.sink.count() >= 5));
    rig.session.pause();

    // first stamp is the load preview
    let stamps = rig.sink.stamps();
    for pair in stamps[1..5].windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(35), "gap {gap:?}");
        assert!(gap < Duration::from_millis(500), "gap {gap:?}");
    }
}

#[test]
fn pause_stops_within_one_frame() {
    let rig = loaded(StaticDecoder::numbered(5, 8, 8, 1.0));
    let preview = rig.sink.count();
    rig.session.play();

    assert!(wait_until(Duration::from_secs(3), || {
        rig.sink.count() >= preview + 2
    }));
    rig.session.pause();
    assert_eq!(rig.session.playback_state(), PlaybackState::Paused);

    let at_pause = rig.sink.count();
    std::thread::sleep(Duration::from_millis(1200));
    assert!(rig.sink.count() <= at_pause + 1);
    assert!(rig.sink.count() <= preview + 3);
}

#[test]
fn playback_picks_up_effect_without_restart() {
    let config = EditorConfig {
        pause_on_effect: false,
        ..Default::default()
    };
    let mut rig = rig(StaticDecoder::numbered(2, 8, 8, 100.0), config);
    rig.session.load(Path::new("clip.mp4")).unwrap();
    rig.session.play();

    rig.session
        .apply_effect(&Effect::Resize { scale: 0.5 })
        .unwrap();
    assert_eq!(rig.session.playback_state(), PlaybackState::Playing);

    // the lap in flight may still show both old frames
    let after_apply = rig.sink.count();
    assert!(wait_until(Duration::from_secs(3), || {
        rig.sink.count() >= after_apply + 3
    }));
    rig.session.pause();

    let frames = rig.sink.frames.lock().unwrap();
    assert_eq!(frames[after_apply as usize + 2].1.dimensions(), (4, 4));
}

#[test]
fn undo_during_playback_keeps_playing_restored_clip() {
    let config = EditorConfig {
        pause_on_effect: false,
        ..Default::default()
    };
    let mut rig = rig(StaticDecoder::numbered(2, 8, 8, 100.0), config);
    rig.session.load(Path::new("clip.mp4")).unwrap();
    let original = rig.session.current().unwrap();
    rig.session.play();

    rig.session
        .apply_effect(&Effect::Resize { scale: 0.5 })
        .unwrap();
    let after_apply = rig.sink.count();
    assert!(wait_until(Duration::from_secs(3), || {
        rig.sink.count() >= after_apply + 3
    }));

    rig.session.undo().unwrap();
    assert_eq!(rig.session.playback_state(), PlaybackState::Playing);
    let after_undo = rig.sink.count();
    assert!(wait_until(Duration::from_secs(3), || {
        rig.sink.count() >= after_undo + 4
    }));
    assert_eq!(rig.session.playback_state(), PlaybackState::Playing);
    rig.session.pause();

    // at most one lap of the resized clip is still in flight after undo
    let frames = rig.sink.frames.lock().unwrap();
    for (_, shown) in &frames[after_undo as usize + 2..after_undo as usize + 4] {
        assert_eq!(shown.dimensions(), (8, 8));
        assert!(original.frames().contains(shown));
    }
}

#[test]
fn resume_restarts_from_first_frame() {
    let rig = loaded(StaticDecoder::numbered(3, 4, 4, 20.0));
    rig.session.play();
    assert!(wait_until(Duration::from_secs(3), || rig.sink.count() >= 3));
    rig.session.pause();

    let before = rig.sink.count() as usize;
    rig.session.resume();
    assert!(wait_until(Duration::from_secs(3), || {
        rig.sink.count() as usize > before
    }));
    rig.session.pause();

    let frames = rig.sink.frames.lock().unwrap();
    assert_eq!(frames[before].1.data()[0], 0);
}

#[test]
fn play_without_clip_does_nothing() {
    let rig = rig(StaticDecoder::bars(1, 4, 4, 30.0), EditorConfig::default());
    rig.session.play();
    rig.session.resume();
    assert_eq!(rig.session.playback_state(), PlaybackState::Idle);
    assert_eq!(rig.sink.count(), 0);
}
