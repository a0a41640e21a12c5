use crate::error::{Result, ScribeError};
use std::collections::VecDeque;

/// Trait for incremental speech recognizers.
///
/// This trait allows swapping implementations (real acoustic model vs
/// scripted mock). A recognizer is strictly causal: only audio it has been
/// fed so far may influence a committed result, and committed text is never
/// revised. Audio must arrive in capture order with no gaps; the recognizer
/// buffers internally and detects utterance endpoints independent of how
/// the stream was chunked.
pub trait Recognizer: Send {
    /// Advances the recognizer by one batch of samples.
    ///
    /// # Returns
    /// `true` when the recognizer has detected a completed endpoint —
    /// committed text is then available from [`Recognizer::result`].
    fn accept(&mut self, samples: &[i16]) -> Result<bool>;

    /// Committed text for the endpoint just detected. Resets the boundary;
    /// subsequent audio starts a new utterance.
    fn result(&mut self) -> Result<String>;

    /// Best-effort transcription of audio since the last endpoint.
    /// Superseded by the next partial or committed result.
    fn partial_result(&mut self) -> Result<String>;

    /// Flushes all remaining buffered audio into one committed result, even
    /// if no natural endpoint was detected.
    fn final_result(&mut self) -> Result<String>;
}

/// Allocates one fresh recognizer per session.
///
/// Model data (which is expensive to load) lives in the factory; per-session
/// acoustic state lives in the recognizer it creates.
pub trait RecognizerFactory {
    type Recognizer: Recognizer;

    /// Creates a recognizer bound to the given sample rate.
    fn create(&self, sample_rate: u32) -> Result<Self::Recognizer>;
}

/// One scripted utterance for [`MockRecognizer`].
#[derive(Debug, Clone)]
pub struct ScriptedUtterance {
    /// Cumulative samples (since the previous endpoint) that complete this
    /// utterance.
    pub trigger_samples: usize,
    /// Text committed when the trigger is reached.
    pub text: String,
}

/// Deterministic scripted recognizer for testing.
///
/// Utterances trigger on cumulative sample count, so endpointing does not
/// depend on chunk boundaries — re-chunking the same sample stream yields
/// the same committed text.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    script: VecDeque<ScriptedUtterance>,
    fed: usize,
    last_result: String,
    should_fail_accept: bool,
}

impl MockRecognizer {
    /// Creates a mock that never detects an endpoint and commits nothing.
    pub fn silent() -> Self {
        Self {
            script: VecDeque::new(),
            fed: 0,
            last_result: String::new(),
            should_fail_accept: false,
        }
    }

    /// Creates a mock from `(trigger_samples, text)` pairs.
    pub fn with_script(script: &[(usize, &str)]) -> Self {
        Self {
            script: script
                .iter()
                .map(|(trigger_samples, text)| ScriptedUtterance {
                    trigger_samples: *trigger_samples,
                    text: (*text).to_string(),
                })
                .collect(),
            fed: 0,
            last_result: String::new(),
            should_fail_accept: false,
        }
    }

    /// Configure the mock to fail on every `accept` call.
    pub fn with_accept_failure(mut self) -> Self {
        self.should_fail_accept = true;
        self
    }
}

impl Recognizer for MockRecognizer {
    fn accept(&mut self, samples: &[i16]) -> Result<bool> {
        if self.should_fail_accept {
            return Err(ScribeError::Recognition {
                message: "mock decode failure".to_string(),
            });
        }

        self.fed += samples.len();

        if let Some(front) = self.script.front() {
            if self.fed >= front.trigger_samples {
                let trigger = front.trigger_samples;
                if let Some(utterance) = self.script.pop_front() {
                    self.last_result = utterance.text;
                }
                // Carry the overshoot so endpointing stays independent of
                // how the stream was chunked.
                self.fed -= trigger;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn result(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.last_result))
    }

    fn partial_result(&mut self) -> Result<String> {
        // A proportional prefix of the pending utterance, so partials grow
        // and get revised the way a real recognizer's do.
        match self.script.front() {
            Some(front) if self.fed > 0 && !front.text.is_empty() => {
                let progress = (self.fed.min(front.trigger_samples)) as f64
                    / front.trigger_samples.max(1) as f64;
                let chars = front.text.chars().count();
                let take = ((chars as f64 * progress).ceil() as usize).min(chars);
                Ok(front.text.chars().take(take).collect())
            }
            _ => Ok(String::new()),
        }
    }

    fn final_result(&mut self) -> Result<String> {
        if self.fed > 0 {
            if let Some(utterance) = self.script.pop_front() {
                self.fed = 0;
                return Ok(utterance.text);
            }
        }
        self.fed = 0;
        Ok(String::new())
    }
}

/// Factory producing fresh scripted mocks, one per session.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizerFactory {
    script: Vec<(usize, String)>,
    should_fail_create: bool,
    recognizers_fail_accept: bool,
}

impl MockRecognizerFactory {
    /// Factory for recognizers that commit nothing.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Factory for recognizers running the given script.
    pub fn with_script(script: &[(usize, &str)]) -> Self {
        Self {
            script: script
                .iter()
                .map(|(n, text)| (*n, (*text).to_string()))
                .collect(),
            should_fail_create: false,
            recognizers_fail_accept: false,
        }
    }

    /// Configure the factory to fail on `create` (e.g. missing model).
    pub fn with_create_failure(mut self) -> Self {
        self.should_fail_create = true;
        self
    }

    /// Configure created recognizers to fail on every `accept` call.
    pub fn with_accept_failures(mut self) -> Self {
        self.recognizers_fail_accept = true;
        self
    }
}

impl RecognizerFactory for MockRecognizerFactory {
    type Recognizer = MockRecognizer;

    fn create(&self, _sample_rate: u32) -> Result<MockRecognizer> {
        if self.should_fail_create {
            return Err(ScribeError::ModelNotFound {
                path: "mock-model".to_string(),
            });
        }
        let pairs: Vec<(usize, &str)> = self
            .script
            .iter()
            .map(|(n, text)| (*n, text.as_str()))
            .collect();
        let recognizer = MockRecognizer::with_script(&pairs);
        if self.recognizers_fail_accept {
            return Ok(recognizer.with_accept_failure());
        }
        Ok(recognizer)
    }
}
