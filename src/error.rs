//! Error types for streamscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio source errors
    #[error("Audio capture device unavailable: {detail}")]
    DeviceUnavailable { detail: String },

    #[error("Unsupported audio format: {property} (expected {expected}, got {actual})")]
    UnsupportedFormat {
        property: String,
        expected: String,
        actual: String,
    },

    // Recognizer errors
    #[error("Recognition model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Session contract violations
    #[error("Malformed audio chunk: {reason}")]
    InvalidChunk { reason: String },

    #[error("Transcription session is already active")]
    AlreadyActive,

    #[error("Transcription session is not active")]
    NotActive,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ScribeError {
    /// True for per-chunk errors the driver may drop and continue past
    /// on a live source.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScribeError::InvalidChunk { .. } | ScribeError::Recognition { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;
