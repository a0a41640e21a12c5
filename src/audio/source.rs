use crate::defaults;
use crate::error::{Result, ScribeError};

/// Format contract for one transcription session.
///
/// The sample rate and chunk size are fixed for the lifetime of a session;
/// every chunk a source yields must honor them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub chunk_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            chunk_size: defaults::CHUNK_SIZE_SAMPLES,
        }
    }
}

impl SourceConfig {
    /// Creates a config with a custom chunk size, keeping rate and channel
    /// defaults.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Creates a config with a custom sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// One unit of work for the recognizer: a slice of mono 16-bit samples
/// tagged with the rate they were captured at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioChunk {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Chunk duration in milliseconds at its tagged sample rate.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}

/// Trait for pull-based audio chunk sources.
///
/// This trait allows swapping implementations (live capture, decoded file,
/// mock). Chunks must be yielded in capture order with no gaps, reordering,
/// or duplication; the recognizer assumes a contiguous sample stream.
pub trait AudioChunkSource: Send {
    /// The format contract this source was opened with.
    fn config(&self) -> &SourceConfig;

    /// Pulls the next chunk.
    ///
    /// # Returns
    /// * `Ok(Some(chunk))` - the next chunk, in strict arrival order. Only
    ///   the final chunk before end-of-stream may be shorter than the
    ///   configured chunk size.
    /// * `Ok(None)` - end of stream, permanently. Live sources return this
    ///   on cancellation instead of raising.
    /// * `Err(_)` - the source failed; no further chunks can be produced.
    fn next_chunk(&mut self) -> Result<Option<AudioChunk>>;

    /// True for sources where audio keeps arriving concurrently (live
    /// capture). Drives the per-chunk error policy: transient chunk errors
    /// are dropped for live sources and fatal for finite ones.
    fn is_live(&self) -> bool {
        false
    }
}

/// Mock chunk source for testing.
#[derive(Debug, Clone)]
pub struct MockChunkSource {
    config: SourceConfig,
    chunks: Vec<Vec<i16>>,
    position: usize,
    fail_at: Option<usize>,
    endless: bool,
}

impl MockChunkSource {
    /// Creates a mock that yields the given raw chunks, then end-of-stream.
    pub fn new(chunks: Vec<Vec<i16>>) -> Self {
        Self {
            config: SourceConfig::default(),
            chunks,
            position: 0,
            fail_at: None,
            endless: false,
        }
    }

    /// Creates a live-like mock that yields silence chunks forever; only
    /// cancellation ends a session driven from it.
    pub fn endless(chunk_size: usize) -> Self {
        Self {
            config: SourceConfig::default().with_chunk_size(chunk_size),
            chunks: Vec::new(),
            position: 0,
            fail_at: None,
            endless: true,
        }
    }

    /// Creates a mock from one contiguous sample buffer, re-chunked at the
    /// configured chunk size.
    pub fn from_samples(samples: &[i16], config: SourceConfig) -> Self {
        let chunks = samples
            .chunks(config.chunk_size.max(1))
            .map(|c| c.to_vec())
            .collect();
        Self {
            config,
            chunks,
            position: 0,
            fail_at: None,
            endless: false,
        }
    }

    /// Configure the mock to use a specific source config.
    pub fn with_config(mut self, config: SourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the mock to fail when the given chunk index is pulled.
    pub fn with_failure_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl AudioChunkSource for MockChunkSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn next_chunk(&mut self) -> Result<Option<AudioChunk>> {
        if self.fail_at == Some(self.position) {
            self.position += 1;
            return Err(ScribeError::Other("mock source failure".to_string()));
        }
        if self.endless {
            self.position += 1;
            return Ok(Some(AudioChunk::new(
                vec![0i16; self.config.chunk_size],
                self.config.sample_rate,
            )));
        }
        match self.chunks.get(self.position) {
            Some(samples) => {
                self.position += 1;
                Ok(Some(AudioChunk::new(
                    samples.clone(),
                    self.config.sample_rate,
                )))
            }
            None => Ok(None),
        }
    }

    fn is_live(&self) -> bool {
        self.endless
    }
}
