//! Data types flowing through the pipeline.

use std::time::{Duration, SystemTime};

/// One complete utterance: the concatenated samples of every frame between
/// a detected speech onset and offset, lead-in included.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Concatenated mono 16-bit PCM samples.
    pub samples: Vec<i16>,
    /// Number of frames the utterance spans.
    pub frame_count: usize,
    /// Wall-clock time the utterance started (first frame's capture time).
    pub captured_at: SystemTime,
}

impl Segment {
    /// Duration of this segment in milliseconds at the given sample rate.
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        if sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / sample_rate as u64
    }
}

/// The result of transcribing one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    /// Recognized text, whitespace-trimmed. May be empty.
    pub text: String,
    /// Language the backend decided on (ISO 639-1 code, or "auto" when the
    /// backend does not report one).
    pub language: String,
    /// Confidence of the language decision, when the backend reports one.
    pub language_probability: Option<f32>,
}

/// One line of the session transcript.
///
/// The timestamp is the moment the utterance was CAPTURED, not the moment
/// transcription finished, so entries read in spoken order even when the
/// worker lags behind.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub timestamp: SystemTime,
    pub text: String,
    pub language: String,
    pub language_probability: Option<f32>,
    /// Wall time the backend spent on this segment.
    pub elapsed: Option<Duration>,
}
