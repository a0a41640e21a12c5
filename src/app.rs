//! Composition root for the CLI: wires config, sources, recognizer and
//! session together per subcommand.

#[cfg(feature = "vosk")]
use crate::config::Config;

/// Renders one incremental update to the terminal.
///
/// Partials rewrite the current line (dimmed); finals replace it with the
/// committed text. Goes to stderr so stdout stays clean for the transcript.
#[cfg(all(feature = "cpal-audio", feature = "vosk"))]
fn render_update(update: &crate::stream::transcriber::Update) {
    use crate::stream::transcriber::Update;
    use owo_colors::OwoColorize;
    use std::io::Write;

    match update {
        Update::Partial(text) => {
            eprint!("\r\x1b[2K{}", text.dimmed());
            let _ = std::io::stderr().flush();
        }
        Update::Final(text) if !text.is_empty() => {
            eprintln!("\r\x1b[2K{}", text);
        }
        _ => {}
    }
}

#[cfg(feature = "vosk")]
fn finish(config: &Config, text: &str, save: bool, quiet: bool) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    if quiet {
        println!("{}", text);
    } else {
        eprintln!();
        println!("{}", text);
    }
    if save {
        let path = crate::export::save_transcript(&config.output.transcript_dir, text)?;
        eprintln!("{} {}", "saved:".green(), path.display());
    }
    Ok(())
}

/// Live microphone transcription until Ctrl-C, `--limit`, or stream end.
#[cfg(all(feature = "cpal-audio", feature = "vosk"))]
pub async fn run_live_command(
    config: Config,
    device: Option<String>,
    limit: Option<std::time::Duration>,
    save: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    use crate::audio::capture::LiveChunkSource;
    use crate::cancel::CancelToken;
    use crate::stream::session::spawn_session;
    use crate::stream::transcriber::StreamingTranscriber;
    use crate::stt::vosk::VoskModel;
    use owo_colors::OwoColorize;

    let model = VoskModel::open(&config.model.dir)?;
    let source_config = config.source_config();
    let sample_rate = source_config.sample_rate;

    let cancel = CancelToken::new();
    let source = LiveChunkSource::open(source_config, device.as_deref(), cancel.clone())?;
    let transcriber = StreamingTranscriber::new(model, sample_rate);

    if !quiet {
        eprintln!("{}", "Listening... press Ctrl-C to stop.".dimmed());
    }

    // Ctrl-C and --limit both trip the same session token.
    let ctrlc_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrlc_cancel.cancel();
        }
    });
    if let Some(limit) = limit {
        let limit_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            limit_cancel.cancel();
        });
    }

    let (mut rx, handle) = spawn_session(source, transcriber, cancel);

    while let Some(update) = rx.recv().await {
        if !quiet {
            render_update(&update);
        }
    }

    // The update channel closed, so the worker is done; join is immediate.
    let text = tokio::task::spawn_blocking(move || handle.wait()).await??;
    finish(&config, &text, save, quiet)
}

/// Whole-file transcription.
#[cfg(feature = "vosk")]
pub fn run_file_command(
    config: Config,
    path: &std::path::Path,
    strict: bool,
    save: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    use crate::audio::wav::FormatPolicy;
    use crate::stream::driver::transcribe_file;
    use crate::stt::vosk::VoskModel;

    let model = VoskModel::open(&config.model.dir)?;
    let policy = if strict {
        FormatPolicy::Exact
    } else {
        FormatPolicy::Normalize
    };

    let text = transcribe_file(path, model, config.source_config(), policy)?;
    finish(&config, &text, save, quiet)
}

/// Prints available input devices.
#[cfg(feature = "cpal-audio")]
pub fn run_devices_command() -> anyhow::Result<()> {
    let devices = crate::audio::capture::list_devices()?;
    if devices.is_empty() {
        eprintln!("No audio input devices found.");
        return Ok(());
    }
    for device in devices {
        println!("{}", device);
    }
    Ok(())
}
