//! Default configuration constants for streamscribe.
//!
//! Shared across config types and component defaults to keep the audio
//! contract (rate, channel count, chunk size) consistent everywhere.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and what the bundled
/// recognizer models expect.
pub const SAMPLE_RATE: u32 = 16000;

/// Channel count for all transcription audio. The engine is mono-only;
/// multi-channel input is downmixed before it reaches the recognizer.
pub const CHANNELS: u16 = 1;

/// Default chunk size in samples.
///
/// 4000 samples = 250ms at 16kHz. Small enough for responsive partial
/// results, large enough that per-chunk recognizer overhead stays low.
pub const CHUNK_SIZE_SAMPLES: usize = 4000;

/// Separator inserted between finalized transcript segments.
pub const SEGMENT_SEPARATOR: &str = " ";

/// How long the live source waits on the capture queue before re-checking
/// the cancellation token (ms). Bounds the worst-case stop latency.
pub const CAPTURE_POLL_MS: u64 = 50;

/// Sample width in bits required of file sources that are not normalized.
pub const SAMPLE_WIDTH_BITS: u16 = 16;
