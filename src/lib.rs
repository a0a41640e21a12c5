//! streamscribe - streaming speech-to-text engine
//!
//! Feeds fixed-size chunks of raw audio into a stateful incremental
//! recognizer and turns them into a growing transcript of committed
//! segments plus one revisable partial. The same engine drives live
//! microphone sessions, file-backed batch runs, and a browser-speech feed.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cancel;
pub mod config;
pub mod defaults;
pub mod error;
pub mod export;
pub mod stream;
pub mod stt;
pub mod transcript;
pub mod web;

#[cfg(feature = "cli")]
pub mod cli;

// Composition root for the binary - needs config + CLI types
#[cfg(feature = "cli")]
pub mod app;

// Core seams (source → transcriber → updates)
pub use audio::source::{AudioChunk, AudioChunkSource, MockChunkSource, SourceConfig};
pub use audio::wav::{FormatPolicy, WavChunkSource};
pub use stt::recognizer::{MockRecognizer, MockRecognizerFactory, Recognizer, RecognizerFactory};

#[cfg(feature = "cpal-audio")]
pub use audio::capture::LiveChunkSource;
#[cfg(feature = "vosk")]
pub use stt::vosk::VoskModel;

// Engine
pub use stream::driver::{drive, transcribe_file};
pub use stream::session::{spawn_session, SessionHandle};
pub use stream::transcriber::{SessionState, StreamingTranscriber, Update};
pub use transcript::{TranscriptBuffer, TranscriptSnapshot};

// Session control
pub use cancel::CancelToken;

// Error handling
pub use error::{Result, ScribeError};

// Config
pub use config::Config;

// Browser feed (hybrid dashboard)
pub use web::{WebSpeechFeed, WebSpeechSnapshot};
