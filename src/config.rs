use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
}

/// Audio format and capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub chunk_size: usize,
}

/// Recognition model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Named model directory the recognizer is constructed from.
    pub dir: PathBuf,
}

/// Transcript artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory timestamped transcript files are written to.
    pub transcript_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            chunk_size: defaults::CHUNK_SIZE_SAMPLES,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("vosk-model-small-en-us-0.15"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            transcript_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is
    /// missing. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                let missing = e
                    .downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false);
                if missing {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - STREAMSCRIBE_MODEL_DIR → model.dir
    /// - STREAMSCRIBE_AUDIO_DEVICE → audio.device
    /// - STREAMSCRIBE_CHUNK_SIZE → audio.chunk_size
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("STREAMSCRIBE_MODEL_DIR") {
            if !dir.is_empty() {
                self.model.dir = PathBuf::from(dir);
            }
        }

        if let Ok(device) = std::env::var("STREAMSCRIBE_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        if let Ok(chunk_size) = std::env::var("STREAMSCRIBE_CHUNK_SIZE") {
            if let Ok(parsed) = chunk_size.parse::<usize>() {
                if parsed > 0 {
                    self.audio.chunk_size = parsed;
                }
            }
        }

        self
    }

    /// Session format derived from the audio section.
    pub fn source_config(&self) -> crate::audio::source::SourceConfig {
        crate::audio::source::SourceConfig {
            sample_rate: self.audio.sample_rate,
            channels: defaults::CHANNELS,
            chunk_size: self.audio.chunk_size,
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/streamscribe/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("streamscribe").join("config.toml"))
    }
}
