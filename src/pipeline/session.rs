//! Session controller: wires the frame source, segmenter, transcription
//! worker, and sink into a running two-thread pipeline with clean shutdown.
//!
//! The capture thread is the only producer of segments, including the final
//! flush, and it sets `capture_done` only after that flush is queued. The
//! worker exits only once `capture_done` is set AND the queue is empty, so
//! no utterance spoken before stop is ever dropped.

use crate::audio::frame::Frame;
use crate::audio::source::FrameSource;
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, VadscribeError};
use crate::pipeline::queue::SegmentQueue;
use crate::pipeline::worker::TranscriptionWorker;
use crate::stt::backend::TranscriptionBackend;
use crate::transcript::TranscriptSink;
use crate::vad::classifier::SpeechClassifier;
use crate::vad::segmenter::{SegmenterConfig, SpeechSegmenter};
use crossbeam_channel::bounded;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lifecycle of a transcription session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Created but not started.
    Idle = 0,
    /// Capturing and transcribing.
    Recording = 1,
    /// Stop requested; capture has ceased, queued segments still draining.
    Draining = 2,
    /// Fully shut down.
    Stopped = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Recording,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// State cell shared between the handle and the capture thread.
#[derive(Clone)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(SessionState::Idle as u8)))
    }

    fn get(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    fn set(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// A live-transcription session: continuous capture, segmentation, and
/// transcription from start until stop.
pub struct Session {
    config: Config,
    verbose: bool,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Starts capture and transcription.
    ///
    /// Fails without spawning anything if the backend is not ready or the
    /// source refuses to start.
    pub fn start(
        self,
        mut source: Box<dyn FrameSource>,
        classifier: Box<dyn SpeechClassifier>,
        backend: Arc<dyn TranscriptionBackend>,
        sink: Box<dyn TranscriptSink>,
    ) -> Result<SessionHandle> {
        if !backend.is_ready() {
            return Err(VadscribeError::ModelLoad {
                message: format!(
                    "transcription backend '{}' is not ready",
                    backend.model_name()
                ),
            });
        }

        let segmenter_config =
            SegmenterConfig::from_settings(&self.config.segmenter, &self.config.audio);
        let mut segmenter = SpeechSegmenter::new(classifier, segmenter_config);

        let state = SharedState::new();
        let queue = SegmentQueue::new();
        let capture_done = Arc::new(AtomicBool::new(false));

        source.start()?;
        state.set(SessionState::Recording);

        let source_is_finite = source.is_finite();
        let capture_state = state.clone();
        let capture_queue = queue.clone();
        let capture_flag = capture_done.clone();
        let capture_handle = thread::spawn(move || {
            let idle_interval = Duration::from_millis(defaults::CAPTURE_IDLE_MS);
            let mut consecutive_errors: u32 = 0;
            let mut sequence: u64 = 0;
            let mut frames_read: u64 = 0;

            while capture_state.get() == SessionState::Recording {
                let samples = match source.read_frame() {
                    Ok(s) => {
                        consecutive_errors = 0;
                        s
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= defaults::MAX_READ_ERRORS {
                            eprintln!(
                                "vadscribe: device read failed {consecutive_errors} times in a row: {e}"
                            );
                            eprintln!("vadscribe: check your microphone connection and try again");
                            break;
                        }
                        thread::sleep(idle_interval);
                        continue;
                    }
                };

                if samples.is_empty() {
                    if source_is_finite {
                        // File/scripted source exhausted.
                        break;
                    }
                    // Live source: empty read is normal while the device
                    // fills its buffer. Keep polling.
                    thread::sleep(idle_interval);
                    continue;
                }

                frames_read += 1;
                let frame = Frame::new(samples, sequence);
                sequence += 1;

                if let Some(segment) = segmenter.push(frame) {
                    capture_queue.push(segment);
                }
            }

            if frames_read == 0 && !source_is_finite {
                eprintln!("vadscribe: no audio frames captured from the device");
            }

            // Single point of final flush: an utterance in progress at stop
            // is queued before capture_done is set.
            if let Some(segment) = segmenter.flush() {
                capture_queue.push(segment);
            }

            if let Err(e) = source.stop() {
                eprintln!("vadscribe: failed to stop audio source: {e}");
            }

            capture_flag.store(true, Ordering::SeqCst);
        });

        let (result_tx, result_rx) = bounded(1);
        let worker =
            TranscriptionWorker::new(backend, sink, queue, capture_done.clone(), result_tx)
                .with_sample_rate(self.config.audio.sample_rate)
                .with_verbose(self.verbose);
        let worker_handle = thread::spawn(move || worker.run());

        Ok(SessionHandle {
            state,
            capture: Some(capture_handle),
            worker: Some(worker_handle),
            result_rx: Some(result_rx),
            capture_done,
        })
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    state: SharedState,
    capture: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<()>>,
    result_rx: Option<crossbeam_channel::Receiver<Option<String>>>,
    capture_done: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// True while capture is active.
    pub fn is_running(&self) -> bool {
        self.state.get() == SessionState::Recording
    }

    /// True once the capture thread has flushed its final segment.
    ///
    /// A finite source (WAV file, scripted mock) sets this on exhaustion
    /// without a stop request; callers can poll it to know when `stop`
    /// will no longer cut audio short.
    pub fn capture_finished(&self) -> bool {
        self.capture_done.load(Ordering::SeqCst)
    }

    /// Stops the session and returns the sink's accumulated result.
    ///
    /// Signals capture to cease, waits for the in-progress utterance to be
    /// flushed and every queued segment to be transcribed, then joins both
    /// threads. Idempotent: later calls return `None` immediately.
    pub fn stop(&mut self) -> Option<String> {
        let capture = self.capture.take()?;

        self.state
            .transition(SessionState::Recording, SessionState::Draining);

        join_reporting(capture, "capture");

        // Allow up to 5s for in-flight transcription of the drained queue.
        let result = self
            .result_rx
            .take()
            .and_then(|rx| rx.recv_timeout(Duration::from_secs(5)).ok().flatten());

        if let Some(worker) = self.worker.take() {
            join_reporting(worker, "worker");
        }

        self.state.set(SessionState::Stopped);
        result
    }
}

fn join_reporting(handle: JoinHandle<()>, name: &str) {
    if let Err(panic_info) = handle.join() {
        let msg = panic_info
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("unknown panic");
        eprintln!("vadscribe: {name} thread panicked: {msg}");
    }
}
