//! Browser speech-recognition feed adapter.
//!
//! The hybrid dashboard embeds a page that runs the browser's built-in
//! recognition service and reports opaque state snapshots:
//! `{transcript, isListening, error}`. This adapter folds those snapshots
//! into the same [`Update`] stream the offline engine produces, so the
//! render side has a single contract.
//!
//! Causality is relaxed compared to the offline recognizer: the browser may
//! overwrite earlier interim text freely, which maps onto `Partial`'s
//! replace-wholesale semantics. Text only becomes `Final` when the feed
//! stops listening.

use crate::error::{Result, ScribeError};
use crate::stream::transcriber::Update;
use serde::{Deserialize, Serialize};

/// One state report from the browser-side recognition service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct WebSpeechSnapshot {
    #[serde(default)]
    pub transcript: String,
    #[serde(rename = "isListening", default)]
    pub is_listening: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebSpeechSnapshot {
    /// Parses a snapshot from the JSON the embedded page posts.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScribeError::Other(format!(
            "invalid web speech snapshot: {}",
            e
        )))
    }
}

/// Folds browser snapshots into transcript updates.
#[derive(Debug, Clone, Default)]
pub struct WebSpeechFeed {
    last_transcript: String,
    listening: bool,
}

impl WebSpeechFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the feed last reported itself listening.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Applies one snapshot and returns the resulting update.
    ///
    /// * A transcript revision while listening is a `Partial` carrying the
    ///   whole revised text.
    /// * The listening→stopped edge commits the transcript as a `Final`.
    /// * An unchanged snapshot is `Empty`.
    ///
    /// # Errors
    /// A reported error surfaces as `ScribeError::Recognition`; the feed
    /// state is reset so a later restart begins cleanly.
    pub fn apply(&mut self, snapshot: &WebSpeechSnapshot) -> Result<Update> {
        if let Some(error) = &snapshot.error {
            if !error.is_empty() {
                self.listening = false;
                self.last_transcript.clear();
                return Err(ScribeError::Recognition {
                    message: error.clone(),
                });
            }
        }

        let was_listening = self.listening;
        self.listening = snapshot.is_listening;

        if snapshot.is_listening {
            if snapshot.transcript != self.last_transcript {
                self.last_transcript = snapshot.transcript.clone();
                return Ok(Update::Partial(snapshot.transcript.clone()));
            }
            return Ok(Update::Empty);
        }

        if was_listening {
            let text = std::mem::take(&mut self.last_transcript);
            let committed = if snapshot.transcript.is_empty() {
                text
            } else {
                snapshot.transcript.clone()
            };
            return Ok(Update::Final(committed.trim().to_string()));
        }

        Ok(Update::Empty)
    }
}
