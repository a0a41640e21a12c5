//! Driver loop connecting a chunk source to a transcriber.
//!
//! The loop owns session bracketing: it starts the transcriber, pulls
//! chunks until cancellation or end of stream, and guarantees `stop` runs
//! on every exit path so recognizer state is never leaked.

use crate::audio::source::AudioChunkSource;
use crate::audio::wav::{FormatPolicy, WavChunkSource};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::stream::transcriber::{StreamingTranscriber, Update};
use crate::stt::recognizer::RecognizerFactory;
use std::path::Path;

/// Pulls chunks from `source` into `transcriber` until cancelled or the
/// source is exhausted, forwarding every [`Update`] to `on_update`.
///
/// Per-chunk error policy: transient errors (`InvalidChunk`, `Recognition`)
/// are logged and skipped for live sources — the offending chunk is dropped
/// and the session continues. For finite sources they abort: the format
/// check already passed at open time, so a failing chunk means the rest of
/// the file cannot be salvaged.
///
/// # Returns
/// The finalized transcript text after the trailing flush.
pub fn drive<S, F, C>(
    source: &mut S,
    transcriber: &mut StreamingTranscriber<F>,
    cancel: &CancelToken,
    mut on_update: C,
) -> Result<String>
where
    S: AudioChunkSource,
    F: RecognizerFactory,
    C: FnMut(&Update),
{
    transcriber.start()?;

    let outcome = pump(source, transcriber, cancel, &mut on_update);

    // Stop on every exit path; the first error wins.
    match outcome {
        Ok(()) => {
            let flush = transcriber.stop()?;
            on_update(&flush);
            Ok(transcriber.text())
        }
        Err(e) => {
            if transcriber.is_active() {
                if let Err(stop_err) = transcriber.stop() {
                    log::warn!("failed to stop session after error: {}", stop_err);
                }
            }
            Err(e)
        }
    }
}

fn pump<S, F, C>(
    source: &mut S,
    transcriber: &mut StreamingTranscriber<F>,
    cancel: &CancelToken,
    on_update: &mut C,
) -> Result<()>
where
    S: AudioChunkSource,
    F: RecognizerFactory,
    C: FnMut(&Update),
{
    loop {
        if cancel.is_cancelled() {
            log::debug!("stop requested, ending session");
            return Ok(());
        }

        let chunk = match source.next_chunk()? {
            Some(chunk) => chunk,
            None => return Ok(()),
        };

        match transcriber.feed(&chunk) {
            Ok(update) => on_update(&update),
            Err(e) if e.is_transient() && source.is_live() => {
                log::warn!("dropping chunk: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Transcribes a whole WAV file in one synchronous call.
///
/// File-mode processing is single-threaded and deterministic: the same file
/// yields the same transcript on every run.
pub fn transcribe_file<F: RecognizerFactory>(
    path: &Path,
    factory: F,
    config: crate::audio::source::SourceConfig,
    policy: FormatPolicy,
) -> Result<String> {
    let sample_rate = config.sample_rate;
    let mut source = WavChunkSource::open(path, config, policy)?;
    let mut transcriber = StreamingTranscriber::new(factory, sample_rate);
    drive(&mut source, &mut transcriber, &CancelToken::new(), |_| {})
}
