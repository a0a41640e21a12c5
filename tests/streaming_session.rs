//! End-to-end properties of the streaming transcription engine, driven
//! through the public API with scripted recognizers and synthesized WAV
//! files.

use streamscribe::stt::recognizer::MockRecognizerFactory;
use streamscribe::{
    drive, spawn_session, transcribe_file, AudioChunk, CancelToken, FormatPolicy,
    MockChunkSource, ScribeError, SourceConfig, StreamingTranscriber, TranscriptBuffer, Update,
    WebSpeechFeed, WebSpeechSnapshot,
};

const RATE: u32 = 16000;

fn silence_chunks(count: usize, size: usize) -> Vec<Vec<i16>> {
    vec![vec![0i16; size]; count]
}

fn write_wav(path: &std::path::Path, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn transcript_equals_ordered_concatenation_of_finals() {
    let script: &[(usize, &str)] = &[(8000, "the first"), (8000, "the second"), (4000, "tail")];
    let mut source = MockChunkSource::new(silence_chunks(5, 4000));
    let mut transcriber =
        StreamingTranscriber::new(MockRecognizerFactory::with_script(script), RATE);

    let mut finals: Vec<String> = Vec::new();
    let text = drive(&mut source, &mut transcriber, &CancelToken::new(), |u| {
        if let Update::Final(t) = u {
            if !t.is_empty() {
                finals.push(t.clone());
            }
        }
    })
    .unwrap();

    // Every final exactly once, in emission order, single separator
    assert_eq!(text, finals.join(" "));
    assert_eq!(text, "the first the second tail");
}

#[test]
fn session_contract_violations() {
    let mut transcriber =
        StreamingTranscriber::new(MockRecognizerFactory::silent(), RATE);
    let chunk = AudioChunk::new(vec![0i16; 4000], RATE);

    // feed before start
    assert!(matches!(
        transcriber.feed(&chunk),
        Err(ScribeError::NotActive)
    ));

    // double start
    transcriber.start().unwrap();
    assert!(matches!(
        transcriber.start(),
        Err(ScribeError::AlreadyActive)
    ));

    // feed after stop
    let _ = transcriber.stop().unwrap();
    assert!(matches!(
        transcriber.feed(&chunk),
        Err(ScribeError::NotActive)
    ));
}

#[test]
fn clear_is_idempotent_on_a_stopped_session() {
    let mut source = MockChunkSource::new(silence_chunks(2, 4000));
    let mut transcriber = StreamingTranscriber::new(
        MockRecognizerFactory::with_script(&[(8000, "some content")]),
        RATE,
    );
    let _ = drive(&mut source, &mut transcriber, &CancelToken::new(), |_| {}).unwrap();
    assert_eq!(transcriber.text(), "some content");

    transcriber.clear();
    assert_eq!(transcriber.text(), "");
    transcriber.clear();
    assert_eq!(transcriber.text(), "");
}

#[test]
fn file_mode_is_deterministic_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utterances.wav");
    let samples: Vec<i16> = (0..32_000).map(|i| ((i % 128) * 50) as i16).collect();
    write_wav(&path, RATE, &samples);

    let script: &[(usize, &str)] = &[(10_000, "alpha"), (10_000, "beta"), (10_000, "gamma")];

    let run = || {
        transcribe_file(
            &path,
            MockRecognizerFactory::with_script(script),
            SourceConfig::default(),
            FormatPolicy::Exact,
        )
        .unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_eq!(first, "alpha beta gamma");
}

#[test]
fn finalized_text_is_invariant_under_rechunking() {
    let samples = vec![0i16; 40_000];
    let script: &[(usize, &str)] = &[(16_000, "left"), (16_000, "right")];

    let transcribe_with_chunk_size = |chunk_size: usize| {
        let config = SourceConfig::default().with_chunk_size(chunk_size);
        let mut source = MockChunkSource::from_samples(&samples, config);
        let mut transcriber =
            StreamingTranscriber::new(MockRecognizerFactory::with_script(script), RATE);
        drive(&mut source, &mut transcriber, &CancelToken::new(), |_| {}).unwrap()
    };

    let small = transcribe_with_chunk_size(800);
    let nominal = transcribe_with_chunk_size(4000);
    let large = transcribe_with_chunk_size(7000);

    assert_eq!(small, nominal);
    assert_eq!(nominal, large);
    assert_eq!(small, "left right");
}

#[test]
fn silence_then_stop_yields_empty_transcript() {
    let mut source = MockChunkSource::new(silence_chunks(3, 4000));
    let mut transcriber =
        StreamingTranscriber::new(MockRecognizerFactory::silent(), RATE);

    let text = drive(&mut source, &mut transcriber, &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(text, "");
}

#[test]
fn early_stop_flushes_the_utterance_exactly_once() {
    // One spoken utterance whose natural endpoint never fires: the stop
    // flush must commit it, exactly once.
    let mut transcriber = StreamingTranscriber::new(
        MockRecognizerFactory::with_script(&[(1_000_000, "cut short")]),
        RATE,
    );
    transcriber.start().unwrap();

    for _ in 0..4 {
        let chunk = AudioChunk::new(vec![100i16; 4000], RATE);
        let update = transcriber.feed(&chunk).unwrap();
        assert!(!update.is_final());
    }

    let flush = transcriber.stop().unwrap();
    assert_eq!(flush, Update::Final("cut short".to_string()));
    assert_eq!(transcriber.text(), "cut short");
}

#[test]
fn exact_policy_rejects_wrong_sample_rate_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wrong-rate.wav");
    write_wav(&path, 44_100, &vec![0i16; 4410]);

    let result = transcribe_file(
        &path,
        MockRecognizerFactory::silent(),
        SourceConfig::default(),
        FormatPolicy::Exact,
    );

    match result {
        Err(ScribeError::UnsupportedFormat {
            property,
            expected,
            actual,
        }) => {
            assert_eq!(property, "sample rate");
            assert_eq!(expected, "16000 Hz");
            assert_eq!(actual, "44100 Hz");
        }
        other => panic!("Expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn normalized_file_matches_native_file_transcript() {
    // The same waveform written natively at 16kHz and upsampled at 48kHz
    // re-chunks to (approximately) the same sample count after
    // normalization, so a sample-count-scripted recognizer commits the same
    // text for both.
    let dir = tempfile::tempdir().unwrap();

    let native: Vec<i16> = vec![500i16; 16_000];
    let native_path = dir.path().join("native.wav");
    write_wav(&native_path, RATE, &native);

    let upsampled: Vec<i16> = vec![500i16; 48_000];
    let upsampled_path = dir.path().join("upsampled.wav");
    write_wav(&upsampled_path, 48_000, &upsampled);

    let script: &[(usize, &str)] = &[(8_000, "steady tone")];
    let run = |path: &std::path::Path| {
        transcribe_file(
            path,
            MockRecognizerFactory::with_script(script),
            SourceConfig::default(),
            FormatPolicy::Normalize,
        )
        .unwrap()
    };

    assert_eq!(run(&native_path), run(&upsampled_path));
}

#[tokio::test]
async fn live_session_cancellation_flushes_and_ends() {
    // Endless live-like source; only cancellation ends the session.
    let source = MockChunkSource::endless(400);
    let transcriber = StreamingTranscriber::new(
        MockRecognizerFactory::with_script(&[(1_000_000_000, "in flight")]),
        RATE,
    );
    let cancel = CancelToken::new();
    let (mut rx, handle) = spawn_session(source, transcriber, cancel);

    // Wait for the session to produce something, then stop it
    let first = rx.recv().await;
    assert!(first.is_some());
    handle.stop();

    let mut last_update = None;
    while let Some(update) = rx.recv().await {
        last_update = Some(update);
    }

    // The trailing flush committed the in-flight utterance
    assert_eq!(last_update, Some(Update::Final("in flight".to_string())));
    let text = handle.wait().unwrap();
    assert_eq!(text, "in flight");
}

#[test]
fn web_feed_updates_compose_with_a_transcript_buffer() {
    // The browser feed honors the same Update contract, so its stream can
    // be folded into a TranscriptBuffer exactly like the offline engine's.
    let mut feed = WebSpeechFeed::new();
    let mut buffer = TranscriptBuffer::new();

    let snapshots = [
        WebSpeechSnapshot {
            transcript: "hello".to_string(),
            is_listening: true,
            error: None,
        },
        WebSpeechSnapshot {
            transcript: "hello world".to_string(),
            is_listening: true,
            error: None,
        },
        WebSpeechSnapshot {
            transcript: "hello world".to_string(),
            is_listening: false,
            error: None,
        },
    ];

    for snapshot in &snapshots {
        match feed.apply(snapshot).unwrap() {
            Update::Partial(text) => buffer.set_partial(&text),
            Update::Final(text) => buffer.push_final(&text),
            Update::Empty => {}
        }
    }

    assert_eq!(buffer.text(), "hello world");
    assert!(buffer.partial().is_none());
}
