//! Hysteresis segmentation of classified frames into utterances.
//!
//! The segmenter is a two-state machine smoothing the per-frame classifier
//! signal. Unvoiced: frames accumulate in a rolling ring; when at least
//! `trigger_ratio` of the ring is voiced, an utterance begins and is seeded
//! with the ring contents so the onset's lead-in audio is kept. Voiced:
//! every frame joins the utterance; when at least `trigger_ratio` of the
//! ring is unvoiced, the utterance ends and is emitted.

use crate::audio::frame::Frame;
use crate::defaults;
use crate::pipeline::types::Segment;
use crate::vad::classifier::SpeechClassifier;
use crate::vad::ring::FrameRing;
use std::time::SystemTime;

/// Tuning for the segmentation state machine.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Frames held in the rolling window.
    pub ring_capacity: usize,
    /// Fraction of the window that must agree before changing state.
    pub trigger_ratio: f32,
    /// Utterances of this many frames or fewer are discarded as noise.
    pub min_segment_frames: usize,
    /// Sample rate handed to the classifier.
    pub sample_rate: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            ring_capacity: defaults::RING_CAPACITY,
            trigger_ratio: defaults::TRIGGER_RATIO,
            min_segment_frames: defaults::MIN_SEGMENT_FRAMES,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl SegmenterConfig {
    /// Derive the tuning from loaded configuration.
    pub fn from_settings(settings: &crate::config::SegmenterSettings, audio: &crate::config::AudioConfig) -> Self {
        let frame_ms = audio.frame_duration_ms.max(1);
        Self {
            ring_capacity: ((settings.padding_ms / frame_ms) as usize).max(1),
            trigger_ratio: settings.trigger_ratio,
            min_segment_frames: settings.min_segment_frames,
            sample_rate: audio.sample_rate,
        }
    }

    /// Number of agreeing frames needed to change state.
    fn trigger_count(&self) -> usize {
        let count = (self.trigger_ratio * self.ring_capacity as f32).ceil() as usize;
        count.clamp(1, self.ring_capacity)
    }
}

/// Accumulates classified frames into speech segments.
pub struct SpeechSegmenter {
    config: SegmenterConfig,
    classifier: Box<dyn SpeechClassifier>,
    ring: FrameRing,
    utterance: Vec<Frame>,
    utterance_started: Option<SystemTime>,
    triggered: bool,
    warned_classifier: bool,
}

impl SpeechSegmenter {
    pub fn new(classifier: Box<dyn SpeechClassifier>, config: SegmenterConfig) -> Self {
        let ring = FrameRing::new(config.ring_capacity);
        Self {
            config,
            classifier,
            ring,
            utterance: Vec::new(),
            utterance_started: None,
            triggered: false,
            warned_classifier: false,
        }
    }

    /// Whether an utterance is currently being accumulated.
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Feed one frame through the state machine.
    ///
    /// Returns a completed segment when this frame confirms a speech offset
    /// and the utterance is long enough to keep.
    pub fn push(&mut self, frame: Frame) -> Option<Segment> {
        let is_speech = self.classify(&frame);

        if !self.triggered {
            self.ring.push(frame, is_speech);

            if self.ring.voiced() >= self.config.trigger_count() {
                // Speech onset: seed the utterance with the rolling window
                // so the lead-in audio is transcribed too.
                self.triggered = true;
                self.utterance = self.ring.drain();
                self.utterance_started = Some(wall_clock_of(&self.utterance[0]));
            }
            return None;
        }

        self.utterance.push(frame.clone());
        self.ring.push(frame, is_speech);

        if self.ring.unvoiced() >= self.config.trigger_count() {
            self.triggered = false;
            self.ring.clear();
            let frames = std::mem::take(&mut self.utterance);
            let started = self.utterance_started.take();

            if frames.len() > self.config.min_segment_frames {
                return Some(build_segment(frames, started));
            }
            // Too short: noise burst, discard.
        }

        None
    }

    /// Emit the in-progress utterance, if any, regardless of length.
    ///
    /// Called at session stop so speech cut off mid-utterance is not lost.
    /// Resets the state machine either way.
    pub fn flush(&mut self) -> Option<Segment> {
        self.ring.clear();
        self.triggered = false;
        let frames = std::mem::take(&mut self.utterance);
        let started = self.utterance_started.take();

        if frames.is_empty() {
            return None;
        }
        Some(build_segment(frames, started))
    }

    fn classify(&mut self, frame: &Frame) -> bool {
        match self
            .classifier
            .classify(&frame.samples, self.config.sample_rate)
        {
            Ok(is_speech) => is_speech,
            Err(e) => {
                if !self.warned_classifier {
                    self.warned_classifier = true;
                    eprintln!("vadscribe: speech classifier error: {e}; treating frames as unvoiced");
                }
                false
            }
        }
    }
}

fn build_segment(frames: Vec<Frame>, started: Option<SystemTime>) -> Segment {
    let frame_count = frames.len();
    let mut samples = Vec::with_capacity(frames.iter().map(|f| f.samples.len()).sum());
    for frame in frames {
        samples.extend_from_slice(&frame.samples);
    }
    Segment {
        samples,
        frame_count,
        captured_at: started.unwrap_or_else(SystemTime::now),
    }
}

/// Map a frame's monotonic capture instant onto the wall clock.
fn wall_clock_of(frame: &Frame) -> SystemTime {
    SystemTime::now() - frame.captured_at.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vad::classifier::MockClassifier;

    fn frame(sequence: u64, value: i16) -> Frame {
        Frame::new(vec![value; 480], sequence)
    }

    fn segmenter_with(decisions: Vec<bool>) -> SpeechSegmenter {
        SpeechSegmenter::new(
            Box::new(MockClassifier::new().with_decisions(decisions)),
            SegmenterConfig::default(),
        )
    }

    #[test]
    fn trigger_count_is_nine_of_ten_by_default() {
        assert_eq!(SegmenterConfig::default().trigger_count(), 9);
    }

    #[test]
    fn nine_voiced_of_ten_triggers() {
        // 1 unvoiced, then 9 voiced: the tenth frame tips the window to 9/10.
        let mut decisions = vec![false];
        decisions.extend(vec![true; 9]);
        let mut segmenter = segmenter_with(decisions);

        for i in 0..9 {
            assert!(segmenter.push(frame(i, 1000)).is_none());
            assert!(!segmenter.is_triggered());
        }
        segmenter.push(frame(9, 1000));
        assert!(segmenter.is_triggered());
    }

    #[test]
    fn eight_voiced_of_ten_does_not_trigger() {
        let mut decisions = vec![false, false];
        decisions.extend(vec![true; 8]);
        let mut segmenter = segmenter_with(decisions);

        for i in 0..10 {
            segmenter.push(frame(i, 1000));
        }
        assert!(!segmenter.is_triggered());
    }

    #[test]
    fn nine_unvoiced_of_ten_ends_utterance() {
        // Trigger with 9 voiced, keep one voiced frame in the window, then
        // feed unvoiced frames: the 9th unvoiced tips the window to 9/10
        // and must finalize the utterance on exactly that push.
        let mut decisions = vec![true; 10];
        decisions.extend(vec![false; 9]);
        let mut segmenter = segmenter_with(decisions);

        for i in 0..18 {
            assert!(segmenter.push(frame(i, 1000)).is_none());
        }
        assert!(segmenter.is_triggered());

        let segment = segmenter.push(frame(18, 0)).expect("9/10 unvoiced ends");
        assert!(!segmenter.is_triggered());
        // 9-frame seed + 1 voiced + 9 unvoiced trailing frames.
        assert_eq!(segment.frame_count, 19);
    }

    #[test]
    fn eight_unvoiced_of_ten_keeps_accumulating() {
        // Two voiced frames in the window hold the unvoiced count at 8/10;
        // the utterance stays open until a 9th unvoiced frame arrives.
        let mut decisions = vec![true; 11];
        decisions.extend(vec![false; 8]);
        let mut segmenter = segmenter_with(decisions);

        for i in 0..19 {
            assert!(segmenter.push(frame(i, 1000)).is_none());
        }
        assert!(segmenter.is_triggered());

        // One more unvoiced frame (the script's last decision repeats)
        // evicts a voiced frame and tips the window to 9/10.
        assert!(segmenter.push(frame(19, 0)).is_some());
        assert!(!segmenter.is_triggered());
    }

    #[test]
    fn segment_includes_lead_in_from_ring() {
        // 5 unvoiced frames, 40 voiced, then unvoiced until offset.
        let mut decisions = vec![false; 5];
        decisions.extend(vec![true; 40]);
        decisions.extend(vec![false; 20]);
        let mut segmenter = segmenter_with(decisions);

        let mut segment = None;
        for i in 0..65 {
            if let Some(s) = segmenter.push(frame(i, 1000)) {
                segment = Some(s);
                break;
            }
        }

        let segment = segment.expect("offset should emit a segment");
        // The window seeding the utterance held the last unvoiced lead-in
        // frame plus the first voiced frames, so the count exceeds the
        // voiced run alone would suggest once trailing frames are added.
        assert!(segment.frame_count > 40, "got {}", segment.frame_count);
        assert_eq!(segment.samples.len(), segment.frame_count * 480);
        assert!(!segmenter.is_triggered());
    }

    #[test]
    fn all_silence_emits_nothing() {
        let mut segmenter = segmenter_with(vec![false; 100]);
        for i in 0..100 {
            assert!(segmenter.push(frame(i, 0)).is_none());
        }
        assert!(!segmenter.is_triggered());
        // Nothing in progress either.
        assert!(segmenter.flush().is_none());
    }

    #[test]
    fn short_burst_is_discarded() {
        let config = SegmenterConfig {
            ring_capacity: 4,
            trigger_ratio: 0.5,
            min_segment_frames: 20,
            sample_rate: 16000,
        };
        // Trigger quickly, then go quiet: utterance stays under 20 frames.
        let mut decisions = vec![true; 4];
        decisions.extend(vec![false; 10]);
        let mut segmenter = SpeechSegmenter::new(
            Box::new(MockClassifier::new().with_decisions(decisions)),
            config,
        );

        for i in 0..14 {
            assert!(segmenter.push(frame(i, 1000)).is_none());
        }
        assert!(!segmenter.is_triggered());
    }

    #[test]
    fn exactly_min_frames_is_discarded() {
        // Emission requires strictly more than min_segment_frames.
        let config = SegmenterConfig {
            ring_capacity: 2,
            trigger_ratio: 1.0,
            min_segment_frames: 4,
            sample_rate: 16000,
        };
        // 2 voiced to trigger (utterance seeded with 2), then 2 unvoiced to
        // end it: utterance is exactly 4 frames.
        let decisions = vec![true, true, false, false];
        let mut segmenter = SpeechSegmenter::new(
            Box::new(MockClassifier::new().with_decisions(decisions)),
            config,
        );

        for i in 0..4 {
            assert!(segmenter.push(frame(i, 1000)).is_none());
        }
        assert!(!segmenter.is_triggered());
    }

    #[test]
    fn flush_emits_in_progress_utterance_below_minimum() {
        let mut decisions = vec![true; 10];
        decisions.extend(vec![true; 2]);
        let mut segmenter = segmenter_with(decisions);

        for i in 0..12 {
            segmenter.push(frame(i, 1000));
        }
        assert!(segmenter.is_triggered());

        let segment = segmenter.flush().expect("flush emits the utterance");
        assert_eq!(segment.frame_count, 12);
        assert!(!segmenter.is_triggered());

        // Second flush has nothing left.
        assert!(segmenter.flush().is_none());
    }

    #[test]
    fn flush_when_idle_discards_ring_lead_in() {
        let mut segmenter = segmenter_with(vec![false; 5]);
        for i in 0..5 {
            segmenter.push(frame(i, 0));
        }
        assert!(segmenter.flush().is_none());
    }

    #[test]
    fn classifier_failure_treated_as_unvoiced() {
        // Failing classifier: frames never count as voiced, never triggers.
        let mut segmenter = SpeechSegmenter::new(
            Box::new(MockClassifier::new().with_failure_at(0).with_decisions(vec![])),
            SegmenterConfig::default(),
        );

        for i in 0..20 {
            assert!(segmenter.push(frame(i, 1000)).is_none());
        }
        assert!(!segmenter.is_triggered());
    }

    #[test]
    fn segmenter_detects_second_utterance_after_first() {
        let mut decisions = Vec::new();
        decisions.extend(vec![true; 30]); // first utterance
        decisions.extend(vec![false; 15]); // gap
        decisions.extend(vec![true; 30]); // second utterance
        decisions.extend(vec![false; 15]);
        let mut segmenter = segmenter_with(decisions);

        let mut segments = Vec::new();
        for i in 0..90 {
            if let Some(s) = segmenter.push(frame(i, 1000)) {
                segments.push(s);
            }
        }

        assert_eq!(segments.len(), 2);
        for segment in &segments {
            assert!(segment.frame_count > 10);
        }
    }

    #[test]
    fn from_settings_derives_capacity() {
        let settings = crate::config::SegmenterSettings::default();
        let audio = crate::config::AudioConfig::default();
        let config = SegmenterConfig::from_settings(&settings, &audio);

        assert_eq!(config.ring_capacity, 10);
        assert_eq!(config.trigger_count(), 9);
        assert_eq!(config.sample_rate, 16000);
    }
}
