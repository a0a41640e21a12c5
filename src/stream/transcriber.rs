//! Stateful incremental transcription.
//!
//! One [`StreamingTranscriber`] owns one recognizer's acoustic state and one
//! transcript buffer. Sessions are bracketed by `start`/`stop`; recognizer
//! state is allocated fresh on `start` and dropped on `stop`, never reset in
//! place.

use crate::audio::source::AudioChunk;
use crate::error::{Result, ScribeError};
use crate::stt::recognizer::{Recognizer, RecognizerFactory};
use crate::transcript::{TranscriptBuffer, TranscriptSnapshot};

/// One incremental transcript update, produced per fed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Tentative transcription of audio since the last committed boundary.
    /// Superseded by the next `Partial` or `Final`; never appended verbatim
    /// to the permanent transcript.
    Partial(String),
    /// Text committed at a detected endpoint (or by `stop`). Appended to the
    /// transcript; never retracted or revised.
    Final(String),
    /// No new signal in this chunk.
    Empty,
}

impl Update {
    pub fn is_final(&self) -> bool {
        matches!(self, Update::Final(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Update::Partial(_))
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Stopped,
}

enum Inner<R> {
    Idle,
    Active(R),
    Stopped,
}

/// Streaming transcriber: consumes chunks one at a time, maintains
/// recognizer state, and emits incremental transcript updates.
pub struct StreamingTranscriber<F: RecognizerFactory> {
    factory: F,
    sample_rate: u32,
    inner: Inner<F::Recognizer>,
    buffer: TranscriptBuffer,
}

impl<F: RecognizerFactory> StreamingTranscriber<F> {
    /// Creates an idle transcriber. No recognizer state is allocated until
    /// `start`.
    pub fn new(factory: F, sample_rate: u32) -> Self {
        Self {
            factory,
            sample_rate,
            inner: Inner::Idle,
            buffer: TranscriptBuffer::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.inner {
            Inner::Idle => SessionState::Idle,
            Inner::Active(_) => SessionState::Active,
            Inner::Stopped => SessionState::Stopped,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Sample rate the session is bound to.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Begins a session, allocating fresh recognizer state.
    ///
    /// Starting a `Stopped` transcriber begins a new session that appends to
    /// the retained buffer; `clear` is the only way to empty it.
    ///
    /// # Errors
    /// `ScribeError::AlreadyActive` if a session is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_active() {
            return Err(ScribeError::AlreadyActive);
        }
        let recognizer = self.factory.create(self.sample_rate)?;
        self.inner = Inner::Active(recognizer);
        log::debug!("transcription session started at {} Hz", self.sample_rate);
        Ok(())
    }

    /// Advances the session by exactly one chunk.
    ///
    /// Chunk validation happens before the recognizer is touched, so an
    /// `InvalidChunk` never mutates recognizer state. A `Recognition` error
    /// means the recognizer rejected this one chunk; the session stays
    /// active and later chunks may still succeed.
    ///
    /// # Errors
    /// `ScribeError::NotActive` outside an active session.
    pub fn feed(&mut self, chunk: &AudioChunk) -> Result<Update> {
        let sample_rate = self.sample_rate;
        let recognizer = match &mut self.inner {
            Inner::Active(recognizer) => recognizer,
            _ => return Err(ScribeError::NotActive),
        };

        if chunk.is_empty() {
            return Err(ScribeError::InvalidChunk {
                reason: "empty chunk".to_string(),
            });
        }
        if chunk.sample_rate != sample_rate {
            return Err(ScribeError::InvalidChunk {
                reason: format!(
                    "sample rate {} Hz does not match session rate {} Hz",
                    chunk.sample_rate, sample_rate
                ),
            });
        }

        if recognizer.accept(&chunk.samples)? {
            let text = recognizer.result()?;
            self.buffer.clear_partial();
            if text.is_empty() {
                return Ok(Update::Empty);
            }
            self.buffer.push_final(&text);
            return Ok(Update::Final(text));
        }

        let partial = recognizer.partial_result()?;
        if partial.is_empty() {
            return Ok(Update::Empty);
        }
        self.buffer.set_partial(&partial);
        Ok(Update::Partial(partial))
    }

    /// Ends the session, flushing any in-flight audio into a trailing
    /// committed result and releasing recognizer state.
    ///
    /// The returned update is always `Final`; its text is empty when nothing
    /// was in flight (the buffer is untouched in that case).
    ///
    /// # Errors
    /// `ScribeError::NotActive` outside an active session.
    pub fn stop(&mut self) -> Result<Update> {
        let recognizer = match &mut self.inner {
            Inner::Active(recognizer) => recognizer,
            _ => return Err(ScribeError::NotActive),
        };

        let text = recognizer.final_result()?;
        self.buffer.push_final(&text);
        self.inner = Inner::Stopped;
        log::debug!("transcription session stopped");
        Ok(Update::Final(text))
    }

    /// Discards the transcript, leaving an empty buffer. Valid in any state;
    /// idempotent. Previously committed text is gone once cleared.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Finalized transcript text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Owned snapshot of the transcript for the render side.
    pub fn transcript(&self) -> TranscriptSnapshot {
        self.buffer.snapshot()
    }
}
