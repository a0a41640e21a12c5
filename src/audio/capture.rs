//! Live audio capture using CPAL (Cross-Platform Audio Library).
//!
//! The cpal callback is the producer side of the session: it pushes sample
//! batches into an SPSC channel in capture order. `next_chunk` is the
//! consumer side, assembling fixed-size chunks and observing the session's
//! cancellation token so a stop request never leaves the loop blocked.

use crate::audio::source::{AudioChunk, AudioChunkSource, SourceConfig};
use crate::cancel::CancelToken;
use crate::defaults::CAPTURE_POLL_MS;
use crate::error::{Result, ScribeError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers when
/// probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2.
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

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List available audio input devices, filtered and with preferred devices
/// marked "\[recommended\]".
///
/// # Errors
/// Returns `ScribeError::DeviceUnavailable` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        host.input_devices()
            .map(|devs| devs.collect::<Vec<_>>())
            .map_err(|e| ScribeError::DeviceUnavailable {
                detail: format!("failed to enumerate input devices: {}", e),
            })
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

/// Pick the input device, preferring PipeWire/PulseAudio so the desktop's
/// device selection is respected.
fn find_device(device_name: Option<&str>) -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Some(name) = device_name {
            let devices = host
                .input_devices()
                .map_err(|e| ScribeError::DeviceUnavailable {
                    detail: format!("failed to enumerate input devices: {}", e),
                })?;
            for dev in devices {
                if dev.name().map(|n| n == name).unwrap_or(false) {
                    return Ok(dev);
                }
            }
            return Err(ScribeError::DeviceUnavailable {
                detail: format!("no input device named {:?}", name),
            });
        }

        if let Ok(devices) = host.input_devices() {
            for dev in devices {
                if dev.name().map(|n| is_preferred_device(&n)).unwrap_or(false) {
                    return Ok(dev);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| ScribeError::DeviceUnavailable {
                detail: "no default input device".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is owned by one `LiveChunkSource` and only touched
/// from whichever thread currently owns the source; ownership transfers are
/// whole-value moves, never shared access.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live microphone chunk source.
///
/// Holds an exclusive claim on the capture device from `open` until the
/// stream is dropped. Release is guaranteed on every exit path: the first
/// `Ok(None)` from `next_chunk` drops the stream eagerly, and `Drop` covers
/// consumers that abandon the source mid-iteration.
pub struct LiveChunkSource {
    config: SourceConfig,
    cancel: CancelToken,
    stream: Option<SendableStream>,
    rx: Receiver<Vec<i16>>,
    pending: Vec<i16>,
    done: bool,
}

impl LiveChunkSource {
    /// Opens the capture device and starts the stream.
    ///
    /// # Arguments
    /// * `config` - session format; capture is requested at this rate, mono
    /// * `device_name` - optional device name; default input otherwise
    /// * `cancel` - session token; tripping it ends the stream at the next
    ///   `next_chunk` call
    ///
    /// # Errors
    /// Returns `ScribeError::DeviceUnavailable` if no device is reachable or
    /// the stream cannot be built and started.
    pub fn open(
        config: SourceConfig,
        device_name: Option<&str>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let device = find_device(device_name)?;
        let (tx, rx) = crossbeam_channel::unbounded::<Vec<i16>>();

        let stream = build_stream(&device, &config, tx)?;
        stream.play().map_err(|e| ScribeError::DeviceUnavailable {
            detail: format!("failed to start audio stream: {}", e),
        })?;

        log::debug!(
            "capture stream open: {} Hz mono, {}-sample chunks",
            config.sample_rate,
            config.chunk_size
        );

        Ok(Self {
            config,
            cancel,
            stream: Some(SendableStream(stream)),
            rx,
            pending: Vec::new(),
            done: false,
        })
    }

    /// Drops the stream, releasing the capture device. Idempotent.
    fn release(&mut self) {
        if self.stream.take().is_some() {
            log::debug!("capture stream released");
        }
        self.done = true;
    }
}

impl AudioChunkSource for LiveChunkSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Blocks until a full chunk is available or the session is cancelled.
    ///
    /// Cancellation never raises: the buffered tail (if any) is flushed as
    /// one final short chunk, then end-of-stream is permanent and the
    /// device is released.
    fn next_chunk(&mut self) -> Result<Option<AudioChunk>> {
        loop {
            if self.done {
                return Ok(None);
            }

            if self.pending.len() >= self.config.chunk_size {
                let rest = self.pending.split_off(self.config.chunk_size);
                let chunk = std::mem::replace(&mut self.pending, rest);
                return Ok(Some(AudioChunk::new(chunk, self.config.sample_rate)));
            }

            if self.cancel.is_cancelled() {
                self.release();
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let tail = std::mem::take(&mut self.pending);
                return Ok(Some(AudioChunk::new(tail, self.config.sample_rate)));
            }

            match self.rx.recv_timeout(Duration::from_millis(CAPTURE_POLL_MS)) {
                Ok(samples) => self.pending.extend(samples),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    // Callback side is gone; drain what we have and end.
                    self.release();
                    if self.pending.is_empty() {
                        return Ok(None);
                    }
                    let tail = std::mem::take(&mut self.pending);
                    return Ok(Some(AudioChunk::new(tail, self.config.sample_rate)));
                }
            }
        }
    }

    fn is_live(&self) -> bool {
        true
    }
}

impl Drop for LiveChunkSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Build the input stream at the session format.
///
/// Tries i16 first (zero-copy path; PipeWire/PulseAudio convert
/// transparently), then f32 for devices that only expose float formats.
fn build_stream(
    device: &cpal::Device,
    config: &SourceConfig,
    tx: crossbeam_channel::Sender<Vec<i16>>,
) -> Result<cpal::Stream> {
    let stream_config = cpal::StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let err_callback = |err| {
        log::warn!("audio stream error: {}", err);
    };

    let tx_i16 = tx.clone();
    if let Ok(stream) = device.build_input_stream(
        &stream_config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            let _ = tx_i16.send(data.to_vec());
        },
        err_callback,
        None,
    ) {
        return Ok(stream);
    }

    device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let converted: Vec<i16> = data
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                    .collect();
                let _ = tx.send(converted);
            },
            err_callback,
            None,
        )
        .map_err(|e| ScribeError::DeviceUnavailable {
            detail: format!("failed to build input stream: {}", e),
        })
}
