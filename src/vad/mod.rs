//! Voice activity detection: per-frame classification and hysteresis
//! segmentation into utterances.

pub mod classifier;
pub mod ring;
pub mod segmenter;
#[cfg(feature = "webrtc")]
pub mod webrtc;
