//! Audio chunk sources.
//!
//! A source yields fixed-size chunks of mono 16-bit PCM through a uniform
//! pull interface, whether the audio comes from a live capture device
//! (infinite, cancellable) or a pre-decoded file buffer (finite).

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod source;
pub mod wav;

pub use source::{AudioChunk, AudioChunkSource, MockChunkSource, SourceConfig};
pub use wav::{FormatPolicy, WavChunkSource};

#[cfg(feature = "cpal-audio")]
pub use capture::{list_devices, LiveChunkSource};
