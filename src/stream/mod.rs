//! Streaming transcription engine.
//!
//! ```text
//! ┌──────────────┐  chunks   ┌─────────────────────┐  updates   ┌──────────┐
//! │ AudioChunk   │──────────▶│ StreamingTranscriber│───────────▶│ render / │
//! │ Source       │  driver   │ (recognizer state + │  observer  │ collect  │
//! │ (mic / file) │   loop    │  transcript buffer) │            │          │
//! └──────────────┘           └─────────────────────┘            └──────────┘
//! ```
//!
//! The driver loop pulls chunks and pushes them into the transcriber until
//! cancelled (live) or the source is exhausted (file); every push yields an
//! [`Update`] the caller renders.

pub mod driver;
pub mod session;
pub mod transcriber;

pub use driver::{drive, transcribe_file};
pub use session::{spawn_session, SessionHandle};
pub use transcriber::{SessionState, StreamingTranscriber, Update};
