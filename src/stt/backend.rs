use crate::defaults;
use crate::error::{Result, VadscribeError};
use crate::pipeline::types::Transcription;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe a segment of 16-bit PCM mono audio at 16kHz.
    fn transcribe(&self, audio: &[i16]) -> Result<Transcription>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the backend is ready to transcribe
    fn is_ready(&self) -> bool;
}

/// Implement TranscriptionBackend for Arc<T> to allow sharing across threads.
impl<T: TranscriptionBackend + ?Sized> TranscriptionBackend for Arc<T> {
    fn transcribe(&self, audio: &[i16]) -> Result<Transcription> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Configuration for backend initialization
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub model_path: PathBuf,
    pub language: String,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(""),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

/// Mock backend for testing
#[derive(Debug, Clone)]
pub struct MockBackend {
    model_name: String,
    response: String,
    language: String,
    language_probability: Option<f32>,
    delay: Option<Duration>,
    should_fail: bool,
}

impl MockBackend {
    /// Create a new mock backend with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            language: "en".to_string(),
            language_probability: None,
            delay: None,
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the reported language
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Configure the reported language probability
    pub fn with_probability(mut self, probability: f32) -> Self {
        self.language_probability = Some(probability);
        self
    }

    /// Configure a per-call delay, to simulate slow inference
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl TranscriptionBackend for MockBackend {
    fn transcribe(&self, _audio: &[i16]) -> Result<Transcription> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.should_fail {
            Err(VadscribeError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(Transcription {
                text: self.response.clone(),
                language: self.language.clone(),
                language_probability: self.language_probability,
            })
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
