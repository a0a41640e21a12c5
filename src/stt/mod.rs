//! Speech recognizers.
//!
//! The engine talks to recognizers through the [`Recognizer`] trait; a
//! [`RecognizerFactory`] allocates one fresh recognizer per session so
//! acoustic state is never shared across sessions.

pub mod recognizer;
#[cfg(feature = "vosk")]
pub mod vosk;

pub use recognizer::{MockRecognizer, MockRecognizerFactory, Recognizer, RecognizerFactory};

#[cfg(feature = "vosk")]
pub use vosk::VoskModel;
