//! WAV file chunk source.
//!
//! Decodes the whole file up front, normalizes it to the session format
//! (or rejects it, depending on policy), then serves sequential fixed-size
//! slices without blocking.

use crate::audio::source::{AudioChunk, AudioChunkSource, SourceConfig};
use crate::defaults::SAMPLE_WIDTH_BITS;
use crate::error::{Result, ScribeError};
use std::io::Read;
use std::path::Path;

/// What to do when a file's encoding does not match the session format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatPolicy {
    /// Downmix, widen/narrow samples, and resample to the session format
    /// before iteration begins.
    Normalize,
    /// Accept only files that already match the session format exactly;
    /// fail with `UnsupportedFormat` naming the mismatched property.
    Exact,
}

/// Audio chunk source backed by a pre-decoded WAV buffer.
///
/// `next_chunk` never blocks. The final slice may be shorter than the
/// configured chunk size; after it, end-of-stream is permanent.
pub struct WavChunkSource {
    config: SourceConfig,
    samples: Vec<i16>,
    position: usize,
}

impl WavChunkSource {
    /// Opens a WAV file from disk.
    pub fn open(path: &Path, config: SourceConfig, policy: FormatPolicy) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(file), config, policy)
    }

    /// Opens a WAV stream from any reader (for testing/flexibility).
    pub fn from_reader(
        reader: Box<dyn Read + Send>,
        config: SourceConfig,
        policy: FormatPolicy,
    ) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader)
            .map_err(|e| ScribeError::Other(format!("Failed to parse WAV file: {}", e)))?;

        let spec = wav_reader.spec();

        if policy == FormatPolicy::Exact {
            check_exact_format(&spec, &config)?;
        }

        let raw = decode_samples(&mut wav_reader, &spec)?;

        let mono = downmix(&raw, spec.channels as usize);

        let samples = if spec.sample_rate != config.sample_rate {
            resample(&mono, spec.sample_rate, config.sample_rate)
        } else {
            mono
        };

        Ok(Self {
            config,
            samples,
            position: 0,
        })
    }

    /// Total number of decoded, normalized samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Consumes the source, returning the normalized sample buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

impl AudioChunkSource for WavChunkSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn next_chunk(&mut self) -> Result<Option<AudioChunk>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = std::cmp::min(self.position + self.config.chunk_size, self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(AudioChunk::new(chunk, self.config.sample_rate)))
    }
}

/// Rejects any property mismatch, naming the property.
fn check_exact_format(spec: &hound::WavSpec, config: &SourceConfig) -> Result<()> {
    if spec.channels != config.channels {
        return Err(ScribeError::UnsupportedFormat {
            property: "channel count".to_string(),
            expected: config.channels.to_string(),
            actual: spec.channels.to_string(),
        });
    }
    if spec.bits_per_sample != SAMPLE_WIDTH_BITS || spec.sample_format != hound::SampleFormat::Int {
        return Err(ScribeError::UnsupportedFormat {
            property: "sample width".to_string(),
            expected: format!("{}-bit int", SAMPLE_WIDTH_BITS),
            actual: match spec.sample_format {
                hound::SampleFormat::Int => format!("{}-bit int", spec.bits_per_sample),
                hound::SampleFormat::Float => format!("{}-bit float", spec.bits_per_sample),
            },
        });
    }
    if spec.sample_rate != config.sample_rate {
        return Err(ScribeError::UnsupportedFormat {
            property: "sample rate".to_string(),
            expected: format!("{} Hz", config.sample_rate),
            actual: format!("{} Hz", spec.sample_rate),
        });
    }
    Ok(())
}

/// Reads every sample as i16, widening or narrowing other encodings.
fn decode_samples<R: Read>(
    reader: &mut hound::WavReader<R>,
    spec: &hound::WavSpec,
) -> Result<Vec<i16>> {
    let read_err =
        |e: hound::Error| ScribeError::Other(format!("Failed to read WAV samples: {}", e));

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err),
        (hound::SampleFormat::Int, bits) if bits < 16 => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v << (16 - bits)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err),
        (hound::SampleFormat::Int, bits) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> (bits - 16)) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err),
        (hound::SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err),
    }
}

/// Mix multi-channel audio to mono by averaging channels.
fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub(crate) fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn open_cursor(data: Vec<u8>, config: SourceConfig, policy: FormatPolicy) -> Result<WavChunkSource> {
        WavChunkSource::from_reader(Box::new(Cursor::new(data)), config, policy)
    }

    #[test]
    fn matching_format_passes_both_policies() {
        let samples = vec![100i16, 200, 300, 400, 500];
        let data = make_wav_data(16000, 1, &samples);

        let exact = open_cursor(data.clone(), SourceConfig::default(), FormatPolicy::Exact).unwrap();
        assert_eq!(exact.sample_count(), 5);

        let normalized =
            open_cursor(data, SourceConfig::default(), FormatPolicy::Normalize).unwrap();
        assert_eq!(normalized.into_samples(), samples);
    }

    #[test]
    fn exact_policy_rejects_wrong_sample_rate_naming_it() {
        let data = make_wav_data(44100, 1, &[0i16; 100]);
        let result = open_cursor(data, SourceConfig::default(), FormatPolicy::Exact);

        match result {
            Err(ScribeError::UnsupportedFormat { property, actual, .. }) => {
                assert_eq!(property, "sample rate");
                assert_eq!(actual, "44100 Hz");
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other.err()),
        }
    }

    #[test]
    fn exact_policy_rejects_wrong_channel_count_naming_it() {
        let data = make_wav_data(16000, 2, &[0i16; 100]);
        let result = open_cursor(data, SourceConfig::default(), FormatPolicy::Exact);

        match result {
            Err(ScribeError::UnsupportedFormat { property, .. }) => {
                assert_eq!(property, "channel count");
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other.err()),
        }
    }

    #[test]
    fn exact_policy_rejects_float_samples_naming_sample_width() {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..16 {
            writer.write_sample(0.0f32).unwrap();
        }
        writer.finalize().unwrap();

        let result = open_cursor(
            cursor.into_inner(),
            SourceConfig::default(),
            FormatPolicy::Exact,
        );
        match result {
            Err(ScribeError::UnsupportedFormat { property, actual, .. }) => {
                assert_eq!(property, "sample width");
                assert_eq!(actual, "32-bit float");
            }
            other => panic!("Expected UnsupportedFormat, got {:?}", other.err()),
        }
    }

    #[test]
    fn normalize_downmixes_stereo() {
        // Stereo pairs: (100, 200), (300, 400), (500, 600)
        let data = make_wav_data(16000, 2, &[100i16, 200, 300, 400, 500, 600]);
        let source =
            open_cursor(data, SourceConfig::default(), FormatPolicy::Normalize).unwrap();

        assert_eq!(source.into_samples(), vec![150i16, 350, 550]);
    }

    #[test]
    fn normalize_resamples_48khz() {
        let data = make_wav_data(48000, 1, &vec![0i16; 48000]); // 1 second
        let source =
            open_cursor(data, SourceConfig::default(), FormatPolicy::Normalize).unwrap();

        let n = source.sample_count();
        assert!((15900..=16100).contains(&n), "got {} samples", n);
    }

    #[test]
    fn normalize_scales_float_samples() {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &v in &[0.0f32, 0.5, -0.5, 1.0] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let source = open_cursor(
            cursor.into_inner(),
            SourceConfig::default(),
            FormatPolicy::Normalize,
        )
        .unwrap();
        let samples = source.into_samples();

        assert_eq!(samples[0], 0);
        assert!((16000..17000).contains(&samples[1]));
        assert!((-17000..-16000).contains(&samples[2]));
        assert_eq!(samples[3], i16::MAX);
    }

    #[test]
    fn chunks_are_sequential_final_short_then_end_of_stream() {
        let data = make_wav_data(16000, 1, &vec![1i16; 9000]);
        let mut source =
            open_cursor(data, SourceConfig::default(), FormatPolicy::Exact).unwrap();

        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 4000);
        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 4000);
        assert_eq!(source.next_chunk().unwrap().unwrap().len(), 1000);
        assert!(source.next_chunk().unwrap().is_none());
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn wav_source_is_not_live() {
        let data = make_wav_data(16000, 1, &[0i16; 16]);
        let source = open_cursor(data, SourceConfig::default(), FormatPolicy::Exact).unwrap();
        assert!(!source.is_live());
    }

    #[test]
    fn invalid_wav_data_returns_error() {
        let result = open_cursor(
            vec![0u8, 1, 2, 3, 4, 5],
            SourceConfig::default(),
            FormatPolicy::Normalize,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_data_returns_error() {
        let result = open_cursor(Vec::new(), SourceConfig::default(), FormatPolicy::Normalize);
        assert!(result.is_err());
    }

    #[test]
    fn resample_identity_same_rate() {
        let samples = vec![100i16, 200, 300];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn resample_upsample_interpolates() {
        let resampled = resample(&[0i16, 1000, 2000], 8000, 16000);
        assert_eq!(resampled.len(), 6);
        assert_eq!(resampled[0], 0);
        assert!(resampled[1] > 0 && resampled[1] < 1000);
        assert_eq!(resampled[2], 1000);
    }

    #[test]
    fn resample_downsample_halves_count() {
        let resampled = resample(&vec![0i16; 3200], 16000, 8000);
        assert_eq!(resampled.len(), 1600);
    }

    #[test]
    fn resample_handles_empty_and_single() {
        assert!(resample(&[], 16000, 8000).is_empty());
        assert_eq!(resample(&[100i16], 16000, 8000), vec![100i16]);
    }

    #[test]
    fn downmix_handles_negative_values() {
        // (-100+100)/2 = 0, (300-300)/2 = 0
        assert_eq!(downmix(&[-100i16, 100, 300, -300], 2), vec![0i16, 0]);
    }
}
