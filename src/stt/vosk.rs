//! Offline recognizer backend built on Vosk/Kaldi.
//!
//! The model directory is loaded once into a [`VoskModel`]; each session
//! gets its own `KaldiRecognizer`-backed [`VoskRecognizer`] so acoustic
//! state is never shared between sessions.

use crate::error::{Result, ScribeError};
use crate::stt::recognizer::{Recognizer, RecognizerFactory};
use std::path::{Path, PathBuf};
use vosk::DecodingState;

/// Loaded Vosk model; the factory side of the recognizer seam.
pub struct VoskModel {
    model: vosk::Model,
    path: PathBuf,
}

impl VoskModel {
    /// Loads the model from a named model directory.
    ///
    /// # Errors
    /// Returns `ScribeError::ModelNotFound` if the directory does not exist
    /// or does not contain a loadable model.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(ScribeError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let model =
            vosk::Model::new(path.to_string_lossy().as_ref()).ok_or_else(|| {
                ScribeError::ModelNotFound {
                    path: path.display().to_string(),
                }
            })?;

        log::debug!("vosk model loaded from {}", path.display());

        Ok(Self {
            model,
            path: path.to_path_buf(),
        })
    }

    /// Directory the model was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecognizerFactory for VoskModel {
    type Recognizer = VoskRecognizer;

    fn create(&self, sample_rate: u32) -> Result<VoskRecognizer> {
        let mut recognizer = vosk::Recognizer::new(&self.model, sample_rate as f32).ok_or_else(
            || ScribeError::Recognition {
                message: format!("failed to allocate recognizer at {} Hz", sample_rate),
            },
        )?;
        recognizer.set_words(true);

        Ok(VoskRecognizer { recognizer })
    }
}

/// Per-session incremental recognizer.
pub struct VoskRecognizer {
    recognizer: vosk::Recognizer,
}

impl Recognizer for VoskRecognizer {
    fn accept(&mut self, samples: &[i16]) -> Result<bool> {
        match self.recognizer.accept_waveform(samples) {
            Ok(DecodingState::Finalized) => Ok(true),
            Ok(DecodingState::Running) => Ok(false),
            Ok(DecodingState::Failed) => Err(ScribeError::Recognition {
                message: "decoder reported failure for chunk".to_string(),
            }),
            Err(e) => Err(ScribeError::Recognition {
                message: format!("accept_waveform: {}", e),
            }),
        }
    }

    fn result(&mut self) -> Result<String> {
        Ok(self
            .recognizer
            .result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default())
    }

    fn partial_result(&mut self) -> Result<String> {
        Ok(self.recognizer.partial_result().partial.to_string())
    }

    fn final_result(&mut self) -> Result<String> {
        Ok(self
            .recognizer
            .final_result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default())
    }
}
