//! Playback scheduler.
//!
//! A single worker thread loops over the published sequence, presenting one
//! frame per frame interval. The wait between frames is a `recv_timeout` on
//! a stop channel, so a pause takes effect within one interval.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use imavid_core::{EditorConfig, FrameSink};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, info, warn};

use crate::handle::SequenceHandle;

/// Playback state machine. `Paused` is the resting state once playback has
/// run at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// How frames are prepared before reaching the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackOptions {
    /// Shrink frames to fit this box before presenting.
    pub preview_max_dimension: Option<u32>,
}

impl PlaybackOptions {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            preview_max_dimension: config
                .playback_preview
                .then_some(config.preview_max_dimension),
        }
    }
}

struct Worker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl Worker {
    fn id(&self) -> ThreadId {
        self.thread.thread().id()
    }
}

#[derive(Default)]
struct Inner {
    state: PlaybackState,
    worker: Option<Worker>,
}

/// Plays the sequence published in a [`SequenceHandle`] to a [`FrameSink`].
///
/// All methods take `&self`, so a sink holding the scheduler may pause it
/// from inside `present`.
pub struct PlaybackScheduler {
    handle: SequenceHandle,
    sink: Arc<dyn FrameSink>,
    options: PlaybackOptions,
    presented: Arc<AtomicU64>,
    inner: Mutex<Inner>,
}

impl PlaybackScheduler {
    pub fn new(handle: SequenceHandle, sink: Arc<dyn FrameSink>, options: PlaybackOptions) -> Self {
        Self {
            handle,
            sink,
            options,
            presented: Arc::new(AtomicU64::new(0)),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Start looping over the published sequence from its first frame.
    ///
    /// A running worker is stopped first. Does nothing when no sequence is
    /// published.
    pub fn play(&self) {
        self.stop_worker();

        if !self.handle.is_published() {
            debug!("Nothing to play");
            return;
        }

        let (stop, stop_rx) = bounded(1);
        let handle = self.handle.clone();
        let sink = Arc::clone(&self.sink);
        let options = self.options;
        let presented = Arc::clone(&self.presented);

        // Held until the worker is registered, so a pause from the sink
        // always finds it.
        let mut inner = self.inner.lock();
        let spawned = thread::Builder::new()
            .name("imavid-playback".into())
            .spawn(move || run(handle, sink, options, stop_rx, presented));

        match spawned {
            Ok(thread) => {
                inner.worker = Some(Worker { stop, thread });
                inner.state = PlaybackState::Playing;
                info!("Playback started");
            }
            Err(e) => warn!("Failed to start playback thread: {}", e),
        }
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// When called from the worker itself (through the sink) the worker is
    /// signalled but not joined; it exits once the sink returns.
    pub fn pause(&self) {
        if self.stop_worker() {
            info!("Playback paused");
        }
    }

    /// Restart playback from the first frame.
    pub fn resume(&self) {
        self.play();
    }

    pub fn state(&self) -> PlaybackState {
        let inner = self.inner.lock();
        match (&inner.worker, inner.state) {
            (Some(worker), PlaybackState::Playing) if worker.thread.is_finished() => {
                PlaybackState::Paused
            }
            (_, state) => state,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Frames handed to the sink since this scheduler was created.
    pub fn frames_presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    pub fn options(&self) -> PlaybackOptions {
        self.options
    }

    /// Returns whether a worker was running.
    fn stop_worker(&self) -> bool {
        let worker = {
            let mut inner = self.inner.lock();
            let worker = inner.worker.take();
            if worker.is_some() {
                inner.state = PlaybackState::Paused;
            }
            worker
        };
        let Some(worker) = worker else {
            return false;
        };

        let _ = worker.stop.try_send(());
        if worker.id() == thread::current().id() {
            return true;
        }
        if worker.thread.join().is_err() {
            warn!("Playback thread panicked");
        }
        true
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// True once a stop was sent or the scheduler went away.
fn stop_requested(stop: &Receiver<()>) -> bool {
    !matches!(stop.try_recv(), Err(TryRecvError::Empty))
}

fn run(
    handle: SequenceHandle,
    sink: Arc<dyn FrameSink>,
    options: PlaybackOptions,
    stop: Receiver<()>,
    presented: Arc<AtomicU64>,
) {
    loop {
        let Some(sequence) = handle.snapshot() else {
            debug!("No sequence published, playback worker exiting");
            return;
        };
        let interval = sequence.frame_rate().frame_interval();
        debug!(
            frames = sequence.len(),
            interval_ms = interval.as_secs_f64() * 1000.0,
            "Playback lap"
        );

        for frame in sequence.frames() {
            if stop_requested(&stop) {
                return;
            }

            let rgb = frame.to_rgb();
            match options.preview_max_dimension {
                Some(max) => sink.present(&rgb.thumbnail(max)),
                None => sink.present(&rgb),
            }
            presented.fetch_add(1, Ordering::Relaxed);

            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}
