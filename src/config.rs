use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub segmenter: SegmenterSettings,
    pub stt: SttConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub frame_duration_ms: u32,
}

/// Utterance segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSettings {
    /// Rolling lookback window in milliseconds.
    pub padding_ms: u32,
    /// Fraction of the window that must agree before changing state.
    pub trigger_ratio: f32,
    /// Utterances of this many frames or fewer are discarded as noise.
    pub min_segment_frames: usize,
    /// RMS threshold for the energy classifier.
    pub energy_threshold: f32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            frame_duration_ms: defaults::FRAME_DURATION_MS,
        }
    }
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            padding_ms: defaults::PADDING_DURATION_MS,
            trigger_ratio: defaults::TRIGGER_RATIO,
            min_segment_frames: defaults::MIN_SEGMENT_FRAMES,
            energy_threshold: defaults::ENERGY_THRESHOLD,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing; invalid TOML is still an
    /// error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                let missing = e
                    .downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false);
                if missing { Ok(Self::default()) } else { Err(e) }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VADSCRIBE_MODEL → stt.model
    /// - VADSCRIBE_LANGUAGE → stt.language
    /// - VADSCRIBE_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("VADSCRIBE_MODEL") {
            if !model.is_empty() {
                self.stt.model = model;
            }
        }

        if let Ok(language) = std::env::var("VADSCRIBE_LANGUAGE") {
            if !language.is_empty() {
                self.stt.language = language;
            }
        }

        if let Ok(device) = std::env::var("VADSCRIBE_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/vadscribe/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vadscribe").join("config.toml"))
    }
}
