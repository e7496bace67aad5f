//! vadscribe - Live speech transcription core
//!
//! Continuous microphone capture, voice-activity segmentation, and
//! Whisper transcription with lossless shutdown.

// Error handling discipline: library code propagates, only tests unwrap.
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod stt;
pub mod transcript;
pub mod vad;

// Core traits (source → segment → transcribe → sink)
pub use audio::frame::Frame;
pub use audio::source::FrameSource;
pub use stt::backend::TranscriptionBackend;
pub use transcript::{CollectorSink, StdoutSink, TranscriptSink};
pub use vad::classifier::SpeechClassifier;

// Pipeline
pub use pipeline::session::{Session, SessionHandle, SessionState};
pub use pipeline::types::{Segment, TranscriptEntry, Transcription};

// Error handling
pub use error::{Result, VadscribeError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
