//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::FrameSource;
use crate::defaults;
use crate::error::{Result, VadscribeError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// Preferred devices are marked with "\[recommended\]"; obviously unusable
/// devices (surround channels, HDMI, etc.) are filtered out.
///
/// # Errors
/// Returns `VadscribeError::Device` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| VadscribeError::Device {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio so
/// the desktop's device selection is respected.
///
/// # Errors
/// Returns `VadscribeError::DeviceNotFound` if no input device is available.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name() {
                    if is_preferred_device(&name) {
                        return Ok(device);
                    }
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| VadscribeError::DeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only accessed from a single thread at a time
/// through the Mutex wrapper in CpalFrameSource.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone frame source backed by CPAL.
///
/// Captures 16-bit PCM at 16kHz mono and serves it in exact frame-sized
/// chunks. Tries i16/16kHz/mono first, then f32, then falls back to the
/// device's native config with software conversion.
pub struct CpalFrameSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<i16>>>,
    callback_count: Arc<std::sync::atomic::AtomicU64>,
    sample_rate: u32,
}

impl CpalFrameSource {
    /// Create a new CPAL frame source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the best default.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| VadscribeError::Device {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if dev.name().map(|n| n == name).unwrap_or(false) {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| VadscribeError::DeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            callback_count: Arc::new(std::sync::atomic::AtomicU64::new(0)),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    /// Build the audio stream with the configured format.
    ///
    /// Tries in order:
    /// 1. i16/16kHz/mono — preferred, zero-copy path
    /// 2. f32/16kHz/mono — for devices that only expose float formats
    /// 3. Device default config — native rate/channels with software conversion
    ///
    /// Step 3 handles PipeWire setups where the ALSA compatibility layer accepts
    /// non-native configs but never fires the data callback.
    fn build_stream(&self) -> Result<cpal::Stream> {
        use std::sync::atomic::Ordering;

        let preferred_config = cpal::StreamConfig {
            channels: defaults::CHANNELS,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("Audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                counter.fetch_add(1, Ordering::Relaxed);
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                    );
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Build a stream using the device's default/native config, with software
    /// channel mixing (stereo→mono) and resampling (native rate→16kHz).
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;
        use std::sync::atomic::Ordering;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| VadscribeError::Device {
                    message: format!("Failed to query default input config: {}", e),
                })?;

        let native_rate = default_config.sample_rate().0;
        let native_channels = default_config.channels() as usize;
        let target_rate = self.sample_rate;

        let stream_config: cpal::StreamConfig = default_config.clone().into();

        eprintln!(
            "vadscribe: using native audio format ({}ch/{}Hz/{:?}), converting in software",
            native_channels,
            native_rate,
            default_config.sample_format(),
        );

        let err_callback = |err| {
            eprintln!("Audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        let counter = Arc::clone(&self.callback_count);

        match default_config.sample_format() {
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let converted = convert_to_mono_target_rate(
                            data,
                            native_channels,
                            native_rate,
                            target_rate,
                        );
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VadscribeError::Device {
                    message: format!("Failed to build native i16 stream: {}", e),
                }),
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        counter.fetch_add(1, Ordering::Relaxed);
                        let i16_data: Vec<i16> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                            .collect();
                        let converted = convert_to_mono_target_rate(
                            &i16_data,
                            native_channels,
                            native_rate,
                            target_rate,
                        );
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VadscribeError::Device {
                    message: format!("Failed to build native f32 stream: {}", e),
                }),
            fmt => Err(VadscribeError::Device {
                message: format!(
                    "Unsupported native sample format: {:?}. \
                     Try specifying a device with --device.",
                    fmt
                ),
            }),
        }
    }
}

/// Mix multi-channel audio to mono and resample to the target rate.
fn convert_to_mono_target_rate(
    samples: &[i16],
    channels: usize,
    source_rate: u32,
    target_rate: u32,
) -> Vec<i16> {
    let mono: Vec<i16> = if channels == 1 {
        samples.to_vec()
    } else {
        samples
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    };

    if source_rate == target_rate {
        mono
    } else {
        crate::audio::wav::resample(&mono, source_rate, target_rate)
    }
}

impl FrameSource for CpalFrameSource {
    fn start(&mut self) -> Result<()> {
        use std::sync::atomic::Ordering;

        {
            let stream_guard = self.stream.lock().map_err(|e| VadscribeError::Device {
                message: format!("Failed to lock stream: {}", e),
            })?;
            if stream_guard.is_some() {
                return Ok(()); // Already started
            }
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| VadscribeError::Device {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        // Wait briefly to check if the CPAL callback actually fires.
        // Some PipeWire-ALSA setups accept non-native configs but never deliver data.
        std::thread::sleep(std::time::Duration::from_millis(200));

        let final_stream = if self.callback_count.load(Ordering::Relaxed) == 0 {
            // Preferred config didn't deliver data — stop it, clear buffer, try native
            drop(stream);
            if let Ok(mut buf) = self.buffer.lock() {
                buf.clear();
            }

            let native_stream = self.build_stream_native()?;
            native_stream.play().map_err(|e| VadscribeError::Device {
                message: format!("Failed to start native audio stream: {}", e),
            })?;
            native_stream
        } else {
            stream
        };

        let mut stream_guard = self.stream.lock().map_err(|e| VadscribeError::Device {
            message: format!("Failed to lock stream: {}", e),
        })?;
        *stream_guard = Some(SendableStream(final_stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut stream_guard = self.stream.lock().map_err(|e| VadscribeError::Device {
            message: format!("Failed to lock stream: {}", e),
        })?;

        if let Some(sendable_stream) = stream_guard.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| VadscribeError::Device {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self.buffer.lock().map_err(|e| VadscribeError::Device {
            message: format!("Failed to lock audio buffer: {}", e),
        })?;

        // Serve exactly one frame; the callback keeps appending behind us.
        if buffer.len() < defaults::FRAME_SAMPLES {
            return Ok(Vec::new());
        }
        Ok(buffer.drain(..defaults::FRAME_SAMPLES).collect())
    }

    fn is_finite(&self) -> bool {
        false
    }
}
