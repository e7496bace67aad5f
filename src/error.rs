//! Error types for vadscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VadscribeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    DeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    Device { message: String },

    // Voice activity classification errors
    #[error("Speech classification failed: {message}")]
    Classifier { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Failed to load transcription model: {message}")]
    ModelLoad { message: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // Transcript sink errors
    #[error("Transcript sink error: {message}")]
    Sink { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VadscribeError>;
