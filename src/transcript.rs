//! Growing transcript of finalized segments plus one revisable partial.
//!
//! Finalized segments are append-only: once a segment is committed it is
//! never edited or reordered. The partial is replaced wholesale on every
//! update and discarded when a segment is finalized.

use crate::defaults::SEGMENT_SEPARATOR;

/// Ordered transcript buffer for one transcription session.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    segments: Vec<String>,
    partial: Option<String>,
}

/// Read-only copy of the buffer for the render side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSnapshot {
    /// Finalized text, segments joined by a single separator.
    pub finalized: String,
    /// In-flight partial, if any.
    pub partial: Option<String>,
}

impl TranscriptSnapshot {
    /// Finalized text followed by the current partial, as rendered to the
    /// user.
    pub fn display_text(&self) -> String {
        match &self.partial {
            Some(partial) if !self.finalized.is_empty() => {
                format!("{}{}{}", self.finalized, SEGMENT_SEPARATOR, partial)
            }
            Some(partial) => partial.clone(),
            None => self.finalized.clone(),
        }
    }
}

impl TranscriptBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finalized segment and discards the current partial.
    ///
    /// Empty segments are ignored; the buffer never holds empty entries.
    pub fn push_final(&mut self, text: &str) {
        self.partial = None;
        if !text.is_empty() {
            self.segments.push(text.to_string());
        }
    }

    /// Replaces the current partial wholesale.
    pub fn set_partial(&mut self, text: &str) {
        self.partial = Some(text.to_string());
    }

    /// Drops the current partial without committing it.
    pub fn clear_partial(&mut self) {
        self.partial = None;
    }

    /// Discards everything, leaving an empty buffer. Idempotent.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.partial = None;
    }

    /// Finalized text only, segments joined by a single separator.
    pub fn text(&self) -> String {
        self.segments.join(SEGMENT_SEPARATOR)
    }

    /// Finalized segments in commit order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Current partial, if any.
    pub fn partial(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    /// True when there are no finalized segments and no partial.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.partial.is_none()
    }

    /// Owned copy for render-side polling; never exposes the buffer for
    /// mutation.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            finalized: self.text(),
            partial: self.partial.clone(),
        }
    }
}
