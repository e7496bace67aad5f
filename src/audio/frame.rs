//! The fixed-duration audio frame, the atomic unit of classification.

use std::time::Instant;

/// A fixed-duration block of mono 16-bit PCM samples.
///
/// Frames are immutable once produced; the segmenter owns them transiently
/// while classifying and accumulates them into utterances.
#[derive(Debug, Clone)]
pub struct Frame {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
    /// Timestamp when this frame was captured.
    pub captured_at: Instant,
}

impl Frame {
    /// Creates a new frame captured now.
    pub fn new(samples: Vec<i16>, sequence: u64) -> Self {
        Self {
            samples,
            sequence,
            captured_at: Instant::now(),
        }
    }

    /// Duration of this frame in milliseconds at the given sample rate.
    pub fn duration_ms(&self, sample_rate: u32) -> u32 {
        if sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000 / sample_rate as u64) as u32
    }
}
