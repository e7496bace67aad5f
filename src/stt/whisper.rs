//! Whisper-based transcription backend.
//!
//! This module provides a Whisper implementation of the TranscriptionBackend
//! trait using whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be
//! installed. To build with Whisper support:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::defaults;
use crate::error::{Result, VadscribeError};
use crate::pipeline::types::Transcription;
use crate::stt::backend::{BackendConfig, TranscriptionBackend};

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Whisper-based transcription backend.
///
/// Uses whisper-rs for speech-to-text. The WhisperContext is wrapped in a
/// Mutex so the backend can be shared across threads.
///
/// # Feature Gate
///
/// The real implementation is only available with the `whisper` feature.
#[cfg(feature = "whisper")]
pub struct WhisperBackend {
    context: Mutex<WhisperContext>,
    config: BackendConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperBackend")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper backend placeholder (without whisper feature).
///
/// A stub that reports not-ready and errors when used, so the session
/// refuses to start instead of silently dropping speech.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperBackend {
    config: BackendConfig,
    model_name: String,
}

fn model_name_of(config: &BackendConfig) -> String {
    config
        .model_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(feature = "whisper")]
impl WhisperBackend {
    /// Create a new Whisper backend.
    ///
    /// # Errors
    /// Returns `VadscribeError::ModelNotFound` if the model file doesn't
    /// exist and `VadscribeError::ModelLoad` if loading fails.
    pub fn new(config: BackendConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(VadscribeError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_of(&config);

        let context_params = WhisperContextParameters::default();
        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| VadscribeError::ModelLoad {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            context_params,
        )
        .map_err(|e| VadscribeError::ModelLoad {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// Whisper expects f32 audio in [-1.0, 1.0]; input is 16-bit PCM.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperBackend {
    /// Create a new Whisper backend (stub implementation).
    pub fn new(config: BackendConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(VadscribeError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_of(&config);
        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Convert i16 audio samples to f32 normalized to [-1.0, 1.0]
    ///
    /// Available without the whisper feature for testing.
    pub fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

#[cfg(feature = "whisper")]
impl TranscriptionBackend for WhisperBackend {
    fn transcribe(&self, audio: &[i16]) -> Result<Transcription> {
        let audio_f32 = Self::convert_audio(audio);

        let context = self
            .context
            .lock()
            .map_err(|e| VadscribeError::Transcription {
                message: format!("Failed to acquire context lock: {}", e),
            })?;

        let mut state = context
            .create_state()
            .map_err(|e| VadscribeError::Transcription {
                message: format!("Failed to create Whisper state: {}", e),
            })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if self.config.language == defaults::AUTO_LANGUAGE {
            params.set_language(None);
        } else {
            params.set_language(Some(&self.config.language));
        }

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        // Disable printing to stdout/stderr
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| VadscribeError::Transcription {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let lang_id = state.full_lang_id_from_state();
        let language = whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string();

        // Text plus a language confidence derived from per-segment
        // no-speech probabilities.
        let mut text = String::new();
        let mut confidence_sum = 0.0_f32;
        let mut segment_count = 0u32;
        for segment in state.as_iter() {
            text.push_str(&segment.to_string());
            confidence_sum += 1.0 - segment.no_speech_probability();
            segment_count += 1;
        }

        let language_probability = if segment_count > 0 {
            Some((confidence_sum / segment_count as f32).clamp(0.0, 1.0))
        } else {
            None
        };

        Ok(Transcription {
            text: text.trim().to_string(),
            language,
            language_probability,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "whisper"))]
impl TranscriptionBackend for WhisperBackend {
    fn transcribe(&self, _audio: &[i16]) -> Result<Transcription> {
        Err(VadscribeError::Transcription {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --features whisper\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}
