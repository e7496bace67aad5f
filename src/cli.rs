//! Command-line interface for vadscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Live microphone transcription with VAD-based utterance segmentation
#[derive(Parser, Debug)]
#[command(
    name = "vadscribe",
    version,
    about = "Live microphone transcription with VAD-based utterance segmentation"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress per-segment output (final transcript only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: language + latency per segment, -vv: session summary)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Transcribe a WAV file instead of the microphone
    #[arg(long, value_name = "FILE")]
    pub wav: Option<PathBuf>,

    /// Audio input device (e.g., hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Path to a Whisper GGML model file
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code for transcription (default: auto-detect). Examples: auto, en, de, es, fr
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Speech classifier: energy or webrtc
    #[arg(long, value_name = "CLASSIFIER", default_value = "energy")]
    pub vad: String,

    /// WebRTC VAD aggressiveness (0 = least, 3 = most aggressive)
    #[arg(long, value_name = "LEVEL", default_value = "3")]
    pub vad_aggressiveness: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}
