//! Audio frame acquisition: the `Frame` type and `FrameSource` implementations.

#[cfg(feature = "capture")]
pub mod capture;
pub mod frame;
pub mod source;
pub mod wav;
