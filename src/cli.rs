//! Command-line interface for streamscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Streaming speech-to-text from microphone or audio files
#[derive(Parser, Debug)]
#[command(
    name = "streamscribe",
    version,
    about = "Streaming speech-to-text from microphone or audio files"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress incremental output (print only the final transcript)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recognition model directory
    #[arg(long, global = true, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe live microphone audio until stopped
    Live {
        /// Audio input device name (see `streamscribe devices`)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// Chunk size in samples (default: 4000 = 250ms at 16kHz)
        #[arg(long, short = 'c', value_name = "SAMPLES")]
        chunk_size: Option<usize>,

        /// Stop automatically after this long. Examples: 30s, 5m, 1h30m
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        limit: Option<Duration>,

        /// Save the transcript to a timestamped text file
        #[arg(long)]
        save: bool,
    },

    /// Transcribe a WAV file
    File {
        /// Path to the WAV file
        path: PathBuf,

        /// Reject files that are not already 16-bit mono at the session
        /// rate, instead of resampling
        #[arg(long)]
        strict: bool,

        /// Save the transcript to a timestamped text file
        #[arg(long)]
        save: bool,
    },

    /// List available audio input devices
    Devices,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Parse a duration string such as `30s`, `5m` or `1h30m`. Bare numbers are
/// seconds.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}
