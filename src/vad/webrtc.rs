//! WebRTC voice activity detector backend for frame classification.

use crate::defaults;
use crate::error::{Result, VadscribeError};
use crate::vad::classifier::SpeechClassifier;
use webrtc_vad::{SampleRate, Vad, VadMode};

/// Classifier backed by the WebRTC voice activity detector.
///
/// Far more robust than energy thresholding in noisy rooms. Accepts only
/// 8/16/32/48kHz input and 10/20/30ms frames.
pub struct WebRtcClassifier {
    vad: Vad,
    sample_rate: u32,
}

// The underlying Fvad handle is owned and used by exactly one thread at a
// time; only the move between threads happens.
unsafe impl Send for WebRtcClassifier {}

impl WebRtcClassifier {
    /// Creates a detector for the given sample rate and aggressiveness
    /// (0 = most permissive, 3 = most aggressive).
    pub fn new(sample_rate: u32, aggressiveness: u8) -> Result<Self> {
        let rate = match sample_rate {
            8_000 => SampleRate::Rate8kHz,
            16_000 => SampleRate::Rate16kHz,
            32_000 => SampleRate::Rate32kHz,
            48_000 => SampleRate::Rate48kHz,
            other => {
                return Err(VadscribeError::Classifier {
                    message: format!("unsupported sample rate for WebRTC VAD: {}Hz", other),
                })
            }
        };
        let mode = match aggressiveness {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            3 => VadMode::VeryAggressive,
            other => {
                return Err(VadscribeError::Classifier {
                    message: format!("VAD aggressiveness must be 0-3, got {}", other),
                })
            }
        };

        let vad = Vad::new_with_rate_and_mode(rate, mode);
        Ok(Self { vad, sample_rate })
    }
}

impl Default for WebRtcClassifier {
    fn default() -> Self {
        // Defaults are always in range.
        match Self::new(defaults::SAMPLE_RATE, 3) {
            Ok(classifier) => classifier,
            Err(_) => unreachable!("default WebRTC VAD parameters are valid"),
        }
    }
}

impl SpeechClassifier for WebRtcClassifier {
    fn classify(&mut self, samples: &[i16], sample_rate: u32) -> Result<bool> {
        if sample_rate != self.sample_rate {
            return Err(VadscribeError::Classifier {
                message: format!(
                    "detector configured for {}Hz, got {}Hz",
                    self.sample_rate, sample_rate
                ),
            });
        }

        self.vad
            .is_voice_segment(samples)
            .map_err(|_| VadscribeError::Classifier {
                message: format!(
                    "WebRTC VAD rejected frame of {} samples at {}Hz",
                    samples.len(),
                    sample_rate
                ),
            })
    }
}
