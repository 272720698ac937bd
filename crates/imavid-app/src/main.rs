//! ImaVid - image and video editor
//!
//! Runs editor commands from a script file or, without one, line by line
//! from stdin.

use anyhow::{Context as _, Result};
use clap::Parser;
use imavid_core::{EditorConfig, Frame, FrameSink};
use imavid_session::{parse_script, Command, Editor};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "imavid", version, about = "Apply effects to images and video clips")]
struct Cli {
    /// Editor configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command script to run instead of reading stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Stands in for the preview widget: logs what would be shown.
#[derive(Default)]
struct LogSink {
    shown: AtomicU64,
}

impl FrameSink for LogSink {
    fn present(&self, frame: &Frame) {
        let n = self.shown.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            frame = n,
            width = frame.width(),
            height = frame.height(),
            "Preview"
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => EditorConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    if !imavid_media::ffmpeg_available() {
        warn!("ffmpeg not found on PATH; video commands will fail");
    }

    let sink = Arc::new(LogSink::default());
    let mut editor = Editor::new(config, sink.clone());
    info!("ImaVid ready");

    match &cli.script {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            let commands = parse_script(&source)?;
            for command in &commands {
                run(&mut editor, command);
            }
        }
        None => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("reading stdin")?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if matches!(line, "quit" | "exit") {
                    break;
                }
                match Command::parse(line) {
                    Ok(command) => run(&mut editor, &command),
                    Err(e) => error!("{}", e),
                }
            }
        }
    }

    editor.video.pause();
    info!(
        previews = sink.shown.load(Ordering::Relaxed),
        played = editor.video.frames_presented(),
        "ImaVid finished"
    );
    Ok(())
}

/// Execute one command; failures are reported and the session carries on.
fn run(editor: &mut Editor, command: &Command) {
    debug!("> {}", command);
    if let Err(e) = editor.execute(command) {
        error!("{}: {}", command, e);
    }
}
