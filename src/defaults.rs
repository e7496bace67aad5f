//! Default tuning constants for vadscribe.
//!
//! Shared across the config types and component defaults so the numbers
//! live in exactly one place.

/// Audio sample rate in Hz.
///
/// 16kHz is the standard rate for speech recognition, and one of the four
/// rates the WebRTC voice activity detector accepts (8k/16k/32k/48k).
pub const SAMPLE_RATE: u32 = 16_000;

/// Number of audio channels. The pipeline is mono end to end.
pub const CHANNELS: u16 = 1;

/// Frame duration in milliseconds.
///
/// 30ms is the largest frame the WebRTC VAD supports and the granularity
/// at which speech onset/offset decisions are made.
pub const FRAME_DURATION_MS: u32 = 30;

/// Samples per frame: 30ms at 16kHz.
pub const FRAME_SAMPLES: usize = (SAMPLE_RATE as usize * FRAME_DURATION_MS as usize) / 1000;

/// Padding window in milliseconds.
///
/// The rolling lookback window used both to seed an utterance's lead-in and
/// to confirm its end. 300ms (10 frames) bounds detection latency while
/// smoothing out per-frame classifier jitter.
pub const PADDING_DURATION_MS: u32 = 300;

/// Ring buffer capacity in frames: padding window / frame duration.
pub const RING_CAPACITY: usize = (PADDING_DURATION_MS / FRAME_DURATION_MS) as usize;

/// Fraction of the padding window that must agree before the segmenter
/// changes state.
///
/// Requiring 90% of the last 10 frames to be voiced (or unvoiced) converts
/// the jittery per-frame signal into a stable onset/offset decision.
/// Empirically tuned; exposed through `SegmenterConfig`.
pub const TRIGGER_RATIO: f32 = 0.9;

/// Minimum utterance length in frames.
///
/// Utterances of this many frames or fewer (300ms) are discarded as noise
/// bursts rather than transcribed. A forced flush at session stop bypasses
/// this check.
pub const MIN_SEGMENT_FRAMES: usize = 10;

/// RMS threshold for the energy-based speech classifier (0.0 to 1.0).
pub const ENERGY_THRESHOLD: f32 = 0.02;

/// Bounded wait used when popping the segment queue and polling the
/// supervisory loop, in milliseconds.
///
/// This is the cooperative-cancellation granularity: shutdown latency is at
/// most one poll interval per waiting loop.
pub const POLL_INTERVAL_MS: u64 = 200;

/// Interval between empty reads from a live frame source, in milliseconds.
pub const CAPTURE_IDLE_MS: u64 = 5;

/// Consecutive device read failures tolerated before the capture context
/// gives up.
pub const MAX_READ_ERRORS: u32 = 10;

/// Default Whisper model name.
pub const DEFAULT_MODEL: &str = "base";

/// Default language code for transcription. "auto" lets the backend detect
/// the spoken language.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";
