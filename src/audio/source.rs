//! The frame source seam: periodic acquisition of fixed-duration raw frames.

use crate::error::{Result, VadscribeError};

/// Trait for devices that produce raw audio frames.
///
/// This trait allows swapping implementations (real capture device, WAV
/// file, scripted mock). A read returns exactly one frame's worth of
/// samples, or an empty vector when no frame is ready yet.
pub trait FrameSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio and release the device.
    fn stop(&mut self) -> Result<()>;

    /// Read one frame of 16-bit PCM samples.
    ///
    /// Returns an empty vector when no frame is available yet (live sources
    /// at startup) or when a finite source is exhausted. Fails with
    /// `VadscribeError::Device` on hardware errors.
    fn read_frame(&mut self) -> Result<Vec<i16>>;

    /// Whether this source ends on its own (file/scripted sources).
    ///
    /// Live microphone sources return false: an empty read means "not yet",
    /// not "done".
    fn is_finite(&self) -> bool {
        false
    }
}

/// One phase of scripted mock output: `count` reads each returning a clone
/// of `samples`.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<i16>,
    pub count: u32,
}

/// Mock frame source for testing.
#[derive(Debug, Clone)]
pub struct MockFrameSource {
    phases: Vec<FramePhase>,
    phase_index: usize,
    reads_in_phase: u32,
    is_started: bool,
    finite: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    should_fail_stop: bool,
    error_message: String,
}

impl MockFrameSource {
    /// Create a new mock that is immediately exhausted.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            phase_index: 0,
            reads_in_phase: 0,
            is_started: false,
            finite: true,
            should_fail_start: false,
            should_fail_read: false,
            should_fail_stop: false,
            error_message: "mock device error".to_string(),
        }
    }

    /// Script the sequence of frames this source serves.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Treat this mock as a live source (empty reads mean "not yet").
    pub fn as_live_source(mut self) -> Self {
        self.finite = false;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on every read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the mock to fail on stop.
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MockFrameSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(VadscribeError::Device {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            return Err(VadscribeError::Device {
                message: self.error_message.clone(),
            });
        }
        self.is_started = false;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(VadscribeError::Device {
                message: self.error_message.clone(),
            });
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.reads_in_phase < phase.count {
                self.reads_in_phase += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.reads_in_phase = 0;
        }

        // Script exhausted
        Ok(Vec::new())
    }

    fn is_finite(&self) -> bool {
        self.finite
    }
}
