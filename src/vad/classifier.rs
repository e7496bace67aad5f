//! Per-frame speech classification.
//!
//! A classifier labels each fixed-duration frame as voiced or unvoiced. The
//! segmenter smooths this jittery signal; classifiers stay stateless per
//! frame.

use crate::defaults;
use crate::error::{Result, VadscribeError};

/// Trait for per-frame voiced/unvoiced decisions.
///
/// Implementations take `&mut self` so detectors with internal handles
/// (native VAD engines) fit behind the same seam as pure functions.
pub trait SpeechClassifier: Send {
    /// Classify one frame of 16-bit PCM samples.
    ///
    /// Returns `Ok(true)` when the frame contains speech. Fails with
    /// `VadscribeError::Classifier` when the frame cannot be classified
    /// (wrong length, engine error).
    fn classify(&mut self, samples: &[i16], sample_rate: u32) -> Result<bool>;
}

/// Energy-based classifier: voiced when the frame's normalized RMS exceeds
/// a threshold.
///
/// Crude compared to a model-based detector, but dependency-free and good
/// enough for quiet rooms.
#[derive(Debug, Clone, Copy)]
pub struct EnergyClassifier {
    threshold: f32,
}

impl EnergyClassifier {
    /// Creates a classifier with the given RMS threshold (0.0 to 1.0).
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Current threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EnergyClassifier {
    fn default() -> Self {
        Self::new(defaults::ENERGY_THRESHOLD)
    }
}

impl SpeechClassifier for EnergyClassifier {
    fn classify(&mut self, samples: &[i16], _sample_rate: u32) -> Result<bool> {
        if samples.is_empty() {
            return Err(VadscribeError::Classifier {
                message: "cannot classify an empty frame".to_string(),
            });
        }
        Ok(calculate_rms(samples) > self.threshold)
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Returns a normalized value (0.0 to 1.0): 0.0 is silence, ~0.707 a
/// full-scale sine wave, 1.0 maximum amplitude.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

/// Mock classifier for testing: serves a scripted sequence of decisions.
#[derive(Debug, Clone, Default)]
pub struct MockClassifier {
    decisions: Vec<bool>,
    position: usize,
    fail_at: Option<usize>,
    calls: usize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the voiced/unvoiced decisions, served in order. Once
    /// exhausted, the last decision repeats (unvoiced if none scripted).
    pub fn with_decisions(mut self, decisions: Vec<bool>) -> Self {
        self.decisions = decisions;
        self
    }

    /// Configure the mock to fail on the Nth call (0-based).
    pub fn with_failure_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Number of classify calls observed.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl SpeechClassifier for MockClassifier {
    fn classify(&mut self, _samples: &[i16], _sample_rate: u32) -> Result<bool> {
        let call = self.calls;
        self.calls += 1;

        if self.fail_at == Some(call) {
            return Err(VadscribeError::Classifier {
                message: "mock classifier failure".to_string(),
            });
        }

        if self.decisions.is_empty() {
            return Ok(false);
        }

        let index = self.position.min(self.decisions.len() - 1);
        if self.position < self.decisions.len() {
            self.position += 1;
        }
        Ok(self.decisions[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_silence(count: usize) -> Vec<i16> {
        vec![0i16; count]
    }

    fn make_speech(count: usize, amplitude: i16) -> Vec<i16> {
        vec![amplitude; count]
    }

    #[test]
    fn rms_silence_is_zero() {
        assert_eq!(calculate_rms(&make_silence(1000)), 0.0);
    }

    #[test]
    fn rms_max_amplitude() {
        let rms = calculate_rms(&make_speech(1000, i16::MAX));
        assert!((rms - 1.0).abs() < 0.001, "RMS should be ~1.0, got {}", rms);
    }

    #[test]
    fn rms_negative_samples() {
        let rms = calculate_rms(&make_speech(1000, i16::MIN));
        // Negative samples should produce the same RMS as positive (squared)
        assert!(rms > 0.99, "RMS should be ~1.0 for i16::MIN, got {}", rms);
    }

    #[test]
    fn rms_mixed_positive_negative() {
        let mut mixed = make_speech(500, 1000);
        mixed.extend(make_speech(500, -1000));
        let rms = calculate_rms(&mixed);
        // RMS of ±1000 should be around 1000/32767 ≈ 0.0305
        assert!(
            rms > 0.025 && rms < 0.035,
            "RMS should be ~0.0305, got {}",
            rms
        );
    }

    #[test]
    fn rms_empty_samples() {
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn energy_classifier_detects_loud_frame() {
        let mut classifier = EnergyClassifier::default();

        // RMS ~0.09, above the 0.02 default threshold
        assert!(classifier.classify(&make_speech(480, 3000), 16000).unwrap());
        assert!(!classifier.classify(&make_silence(480), 16000).unwrap());
    }

    #[test]
    fn energy_classifier_respects_custom_threshold() {
        let mut strict = EnergyClassifier::new(0.5);
        assert!(!strict.classify(&make_speech(480, 3000), 16000).unwrap());

        let mut lenient = EnergyClassifier::new(0.001);
        assert!(lenient.classify(&make_speech(480, 100), 16000).unwrap());
    }

    #[test]
    fn energy_classifier_rejects_empty_frame() {
        let mut classifier = EnergyClassifier::default();
        assert!(matches!(
            classifier.classify(&[], 16000),
            Err(VadscribeError::Classifier { .. })
        ));
    }

    #[test]
    fn mock_serves_scripted_decisions() {
        let mut mock = MockClassifier::new().with_decisions(vec![true, false, true]);

        assert!(mock.classify(&[0], 16000).unwrap());
        assert!(!mock.classify(&[0], 16000).unwrap());
        assert!(mock.classify(&[0], 16000).unwrap());
        // Exhausted: last decision repeats
        assert!(mock.classify(&[0], 16000).unwrap());
        assert_eq!(mock.calls(), 4);
    }

    #[test]
    fn mock_fails_at_scripted_call() {
        let mut mock = MockClassifier::new()
            .with_decisions(vec![true, true, true])
            .with_failure_at(1);

        assert!(mock.classify(&[0], 16000).unwrap());
        assert!(mock.classify(&[0], 16000).is_err());
        assert!(mock.classify(&[0], 16000).unwrap());
    }

    #[test]
    fn mock_without_script_is_unvoiced() {
        let mut mock = MockClassifier::new();
        assert!(!mock.classify(&[0], 16000).unwrap());
    }

    #[test]
    fn trait_is_object_safe() {
        let mut classifier: Box<dyn SpeechClassifier> = Box::new(EnergyClassifier::default());
        assert!(!classifier.classify(&[0i16; 480], 16000).unwrap());
    }
}
