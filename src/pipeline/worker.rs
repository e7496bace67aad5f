//! Transcription worker: drains the segment queue through the backend and
//! into the transcript sink.

use crate::defaults;
use crate::pipeline::queue::SegmentQueue;
use crate::pipeline::types::TranscriptEntry;
use crate::stt::backend::TranscriptionBackend;
use crate::transcript::TranscriptSink;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Rolling latency accounting for transcribed segments.
#[derive(Debug, Default)]
pub struct LatencyStats {
    count: u64,
    total_elapsed: Duration,
    total_audio_ms: u64,
}

impl LatencyStats {
    pub fn record(&mut self, elapsed: Duration, audio_ms: u64) {
        self.count += 1;
        self.total_elapsed += elapsed;
        self.total_audio_ms += audio_ms;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean inference time per segment.
    pub fn average(&self) -> Option<Duration> {
        if self.count == 0 {
            return None;
        }
        Some(self.total_elapsed / self.count as u32)
    }

    /// Inference time divided by audio time. Below 1.0 keeps up with live
    /// capture.
    pub fn realtime_factor(&self) -> Option<f64> {
        if self.total_audio_ms == 0 {
            return None;
        }
        Some(self.total_elapsed.as_millis() as f64 / self.total_audio_ms as f64)
    }

    pub fn summary(&self) -> Option<String> {
        let average = self.average()?;
        let factor = self.realtime_factor().unwrap_or(0.0);
        Some(format!(
            "{} segment(s), avg {}ms, {:.2}x realtime",
            self.count,
            average.as_millis(),
            factor
        ))
    }
}

/// Drains segments until capture finishes and the queue runs dry.
pub struct TranscriptionWorker {
    backend: Arc<dyn TranscriptionBackend>,
    sink: Box<dyn TranscriptSink>,
    queue: SegmentQueue,
    capture_done: Arc<AtomicBool>,
    poll_interval: Duration,
    sample_rate: u32,
    verbose: bool,
    result_tx: Sender<Option<String>>,
}

impl TranscriptionWorker {
    pub fn new(
        backend: Arc<dyn TranscriptionBackend>,
        sink: Box<dyn TranscriptSink>,
        queue: SegmentQueue,
        capture_done: Arc<AtomicBool>,
        result_tx: Sender<Option<String>>,
    ) -> Self {
        Self {
            backend,
            sink,
            queue,
            capture_done,
            poll_interval: Duration::from_millis(defaults::POLL_INTERVAL_MS),
            sample_rate: defaults::SAMPLE_RATE,
            verbose: false,
            result_tx,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run until capture has finished AND every queued segment is drained.
    ///
    /// The exit check happens only after an empty pop, so segments pushed
    /// during the final flush are transcribed before the worker leaves.
    pub fn run(mut self) {
        let mut stats = LatencyStats::default();

        loop {
            let Some(segment) = self.queue.pop(self.poll_interval) else {
                if self.capture_done.load(Ordering::SeqCst) && self.queue.is_empty() {
                    break;
                }
                continue;
            };

            let started = Instant::now();
            let transcription = match self.backend.transcribe(&segment.samples) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("vadscribe: transcription failed: {e}");
                    continue;
                }
            };
            let elapsed = started.elapsed();
            stats.record(elapsed, segment.duration_ms(self.sample_rate));

            // Backends are expected to trim, but don't rely on it.
            let text = transcription.text.trim();
            if text.is_empty() {
                if self.verbose {
                    eprintln!("vadscribe: segment produced no text, skipping");
                }
                continue;
            }

            let entry = TranscriptEntry {
                timestamp: segment.captured_at,
                text: text.to_string(),
                language: transcription.language,
                language_probability: transcription.language_probability,
                elapsed: Some(elapsed),
            };

            if let Err(e) = self.sink.append(&entry) {
                eprintln!("vadscribe: transcript sink failed: {e}");
            }
        }

        if self.verbose {
            if let Some(summary) = stats.summary() {
                eprintln!("vadscribe: {summary}");
            }
        }

        let result = self.sink.flush();
        if self.result_tx.send(result).is_err() {
            eprintln!("vadscribe: result receiver already dropped");
        }
    }
}
