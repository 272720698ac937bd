//! Textual editor commands.
//!
//! Each line of a script is one command, e.g. `apply-video-effect resize 0.5`.
//! Blank lines and lines starting with `#` are skipped by [`parse_script`].

use imavid_core::{EditorConfig, FrameSink, ImavidError, Result};
use imavid_effects::{Effect, PRESETS};
use imavid_media::{
    ClipDecoder, ClipEncoder, EncodeSettings, FfmpegDecoder, FfmpegEncoder, ImageCodec,
    ImageFileCodec,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::image::ImageSession;
use crate::video::VideoSession;

/// One editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    LoadImage { path: PathBuf },
    SaveImage { path: PathBuf },
    ApplyImageEffect { effect: Effect },
    UndoImage,
    LoadVideo { path: PathBuf },
    Play,
    Pause,
    Resume,
    ApplyVideoEffect { effect: Effect },
    UndoVideo,
    SaveVideo { path: PathBuf },
    /// Block the control path, letting playback run.
    Wait { duration: Duration },
    /// List the effect presets.
    Effects,
}

impl Command {
    /// Parse one command line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| ImavidError::InvalidParameter("empty command".into()))?;
        let args: Vec<&str> = words.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "load-image" => Self::LoadImage {
                path: path_arg(name, &args)?,
            },
            "save-image" => Self::SaveImage {
                path: path_arg(name, &args)?,
            },
            "apply-image-effect" => Self::ApplyImageEffect {
                effect: effect_arg(name, &args)?,
            },
            "undo-image" => Self::UndoImage,
            "load-video" => Self::LoadVideo {
                path: path_arg(name, &args)?,
            },
            "play" => Self::Play,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "apply-video-effect" => Self::ApplyVideoEffect {
                effect: effect_arg(name, &args)?,
            },
            "undo-video" => Self::UndoVideo,
            "save-video" => Self::SaveVideo {
                path: path_arg(name, &args)?,
            },
            "wait" => {
                let raw = args.first().ok_or_else(|| {
                    ImavidError::InvalidParameter("wait needs a number of seconds".into())
                })?;
                let secs: f64 = raw.parse().map_err(|_| {
                    ImavidError::InvalidParameter(format!("bad wait duration '{raw}'"))
                })?;
                let duration = Duration::try_from_secs_f64(secs).map_err(|_| {
                    ImavidError::InvalidParameter(format!("bad wait duration '{raw}'"))
                })?;
                Self::Wait { duration }
            }
            "effects" => Self::Effects,
            other => {
                return Err(ImavidError::InvalidParameter(format!(
                    "unknown command '{other}'"
                )))
            }
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadImage { path } => write!(f, "load-image {}", path.display()),
            Self::SaveImage { path } => write!(f, "save-image {}", path.display()),
            Self::ApplyImageEffect { effect } => {
                write!(f, "apply-image-effect {}", effect_words(effect))
            }
            Self::UndoImage => f.write_str("undo-image"),
            Self::LoadVideo { path } => write!(f, "load-video {}", path.display()),
            Self::Play => f.write_str("play"),
            Self::Pause => f.write_str("pause"),
            Self::Resume => f.write_str("resume"),
            Self::ApplyVideoEffect { effect } => {
                write!(f, "apply-video-effect {}", effect_words(effect))
            }
            Self::UndoVideo => f.write_str("undo-video"),
            Self::SaveVideo { path } => write!(f, "save-video {}", path.display()),
            Self::Wait { duration } => write!(f, "wait {}", duration.as_secs_f64()),
            Self::Effects => f.write_str("effects"),
        }
    }
}

/// An effect as command arguments.
fn effect_words(effect: &Effect) -> String {
    match effect {
        Effect::Resize { scale } => format!("resize {scale}"),
        Effect::EnhanceColor { factor } => format!("enhance-color {factor}"),
        other => other.name().to_string(),
    }
}

/// Parse a whole script. Errors carry the 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            Command::parse(line).map_err(|e| match e {
                ImavidError::InvalidParameter(msg) => {
                    ImavidError::InvalidParameter(format!("line {n}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

fn path_arg(command: &str, args: &[&str]) -> Result<PathBuf> {
    if args.is_empty() {
        return Err(ImavidError::InvalidParameter(format!(
            "{command} needs a file path"
        )));
    }
    // paths may contain spaces
    Ok(PathBuf::from(args.join(" ")))
}

fn effect_arg(command: &str, args: &[&str]) -> Result<Effect> {
    match args {
        [name] => Effect::parse(name, None),
        [name, param] => Effect::parse(name, Some(*param)),
        [] => Err(ImavidError::InvalidParameter(format!(
            "{command} needs an effect name"
        ))),
        _ => Err(ImavidError::InvalidParameter(format!(
            "{command} takes an effect name and at most one parameter"
        ))),
    }
}

/// The image and video sessions behind one command stream.
pub struct Editor {
    pub image: ImageSession,
    pub video: VideoSession,
}

impl Editor {
    /// Editor using FFmpeg for clips and the `image` crate for stills.
    pub fn new(config: EditorConfig, sink: Arc<dyn FrameSink>) -> Self {
        let decoder: Arc<dyn ClipDecoder> = Arc::new(FfmpegDecoder::new(&config.ffmpeg));
        let encoder: Arc<dyn ClipEncoder> = Arc::new(FfmpegEncoder::new(EncodeSettings {
            ffmpeg: PathBuf::from(&config.ffmpeg),
            video_codec: config.video_codec.clone(),
            ..Default::default()
        }));
        let codec: Arc<dyn ImageCodec> = Arc::new(ImageFileCodec::new());
        Self::with_backends(config, sink, codec, decoder, encoder)
    }

    /// Editor over caller-supplied codecs.
    pub fn with_backends(
        config: EditorConfig,
        sink: Arc<dyn FrameSink>,
        codec: Arc<dyn ImageCodec>,
        decoder: Arc<dyn ClipDecoder>,
        encoder: Arc<dyn ClipEncoder>,
    ) -> Self {
        Self {
            image: ImageSession::new(codec, Arc::clone(&sink), config.clone()),
            video: VideoSession::new(decoder, encoder, sink, config),
        }
    }

    /// Run one command against the sessions.
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::LoadImage { path } => self.image.load(path),
            Command::SaveImage { path } => self.image.save(path),
            Command::ApplyImageEffect { effect } => self.image.apply_effect(effect),
            Command::UndoImage => self.image.undo(),
            Command::LoadVideo { path } => self.video.load(path),
            Command::Play => {
                self.video.play();
                Ok(())
            }
            Command::Pause => {
                self.video.pause();
                Ok(())
            }
            Command::Resume => {
                self.video.resume();
                Ok(())
            }
            Command::ApplyVideoEffect { effect } => self.video.apply_effect(effect),
            Command::UndoVideo => self.video.undo(),
            Command::SaveVideo { path } => self.video.save(path),
            Command::Wait { duration } => {
                std::thread::sleep(*duration);
                Ok(())
            }
            Command::Effects => {
                for preset in PRESETS {
                    info!("{:<16} {}", preset.name, preset.display_name);
                }
                Ok(())
            }
        }
    }
}
