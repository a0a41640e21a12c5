//! Transcript artifact export.
//!
//! A finished session's transcript can be saved as a plain-text file named
//! with a UTC timestamp, e.g. `transcript_20260808_143015.txt`.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Builds the artifact file name for the given instant.
pub fn transcript_file_name(now: SystemTime) -> String {
    // humantime renders RFC 3339 ("2026-08-08T14:30:15Z"); keep the digits
    // and split into date/time for a shell-friendly name.
    let stamp = humantime::format_rfc3339_seconds(now).to_string();
    let digits: String = stamp.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 14 {
        format!("transcript_{}_{}.txt", &digits[..8], &digits[8..14])
    } else {
        // Pre-epoch or otherwise odd clock; still produce a usable name.
        format!("transcript_{}.txt", digits)
    }
}

/// Writes the transcript to `dir`, creating it if needed.
///
/// # Returns
/// The path of the written file.
pub fn save_transcript(dir: &Path, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(transcript_file_name(SystemTime::now()));
    fs::write(&path, text)?;
    log::debug!("transcript saved to {}", path.display());
    Ok(path)
}
