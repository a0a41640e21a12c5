//! Live session runner.
//!
//! Runs the driver loop on a dedicated worker thread and hands updates to
//! the async side over a tokio channel, so a UI can `recv().await` and
//! redraw per event instead of polling shared state. The worker uses
//! `blocking_send`; the channel is the only data path between the two
//! sides.

use crate::audio::source::AudioChunkSource;
use crate::cancel::CancelToken;
use crate::error::{Result, ScribeError};
use crate::stream::driver::drive;
use crate::stream::transcriber::{StreamingTranscriber, Update};
use crate::stt::recognizer::RecognizerFactory;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Updates buffered between the worker and the renderer. Large enough that
/// the worker never blocks observably at a 250ms chunk cadence.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running transcription session.
pub struct SessionHandle {
    cancel: CancelToken,
    worker: Option<JoinHandle<Result<String>>>,
}

impl SessionHandle {
    /// Requests a stop. The worker observes the token before its next feed,
    /// flushes the in-flight partial, and releases the capture device.
    /// Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// True until the worker has exited.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.is_finished())
            .unwrap_or(false)
    }

    /// Waits for the session to end and returns the finalized transcript.
    ///
    /// Does not request a stop by itself; call [`SessionHandle::stop`] first
    /// to end a live session.
    pub fn wait(mut self) -> Result<String> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| ScribeError::Other("session worker panicked".to_string()))?,
            None => Err(ScribeError::NotActive),
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        // A dropped handle must not leave an unkillable session behind.
        self.cancel.cancel();
    }
}

/// Spawns the driver loop on a worker thread.
///
/// Returns the update stream and a handle for stop/join. The source is
/// moved into the worker; its device claim is released when the driver
/// finishes, on every exit path.
pub fn spawn_session<S, F>(
    mut source: S,
    mut transcriber: StreamingTranscriber<F>,
    cancel: CancelToken,
) -> (mpsc::Receiver<Update>, SessionHandle)
where
    S: AudioChunkSource + 'static,
    F: RecognizerFactory + Send + 'static,
    F::Recognizer: Send,
{
    let (tx, rx) = mpsc::channel::<Update>(UPDATE_CHANNEL_CAPACITY);
    let worker_cancel = cancel.clone();

    let worker = std::thread::spawn(move || {
        drive(&mut source, &mut transcriber, &worker_cancel, |update| {
            // A dropped receiver only means nobody is rendering; the
            // session itself keeps running until cancelled.
            let _ = tx.blocking_send(update.clone());
        })
    });

    let handle = SessionHandle {
        cancel,
        worker: Some(worker),
    };
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::MockChunkSource;
    use crate::defaults::SAMPLE_RATE;
    use crate::stt::recognizer::MockRecognizerFactory;
    use std::time::Duration;

    fn transcriber(script: &[(usize, &str)]) -> StreamingTranscriber<MockRecognizerFactory> {
        StreamingTranscriber::new(MockRecognizerFactory::with_script(script), SAMPLE_RATE)
    }

    #[tokio::test]
    async fn session_streams_updates_and_returns_transcript() {
        let source = MockChunkSource::new(vec![vec![0i16; 4000]; 4]);
        let (mut rx, handle) = spawn_session(
            source,
            transcriber(&[(8000, "first"), (8000, "second")]),
            CancelToken::new(),
        );

        let mut finals = Vec::new();
        while let Some(update) = rx.recv().await {
            if let Update::Final(text) = update {
                if !text.is_empty() {
                    finals.push(text);
                }
            }
        }

        let text = handle.wait().unwrap();
        assert_eq!(text, "first second");
        assert_eq!(finals.join(" "), text);
    }

    #[tokio::test]
    async fn stop_ends_an_infinite_session() {
        // An endless stream of silence chunks
        let source = MockChunkSource::endless(400);
        let (mut rx, handle) = spawn_session(source, transcriber(&[]), CancelToken::new());

        // Let a few updates through, then stop
        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("worker produced no update");
        assert!(first.is_some());

        handle.stop();
        // Drain until the channel closes
        while rx.recv().await.is_some() {}

        let text = handle.wait().unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_wedge_the_worker() {
        let source = MockChunkSource::new(vec![vec![0i16; 4000]; 1000]);
        let (rx, handle) = spawn_session(source, transcriber(&[]), CancelToken::new());
        drop(rx);

        let text = handle.wait().unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn handle_reports_running_state() {
        let source = MockChunkSource::endless(400);
        let (mut rx, handle) = spawn_session(source, transcriber(&[]), CancelToken::new());

        assert!(handle.is_running());
        handle.stop();
        while rx.recv().await.is_some() {}
        // Worker exits shortly after the channel closes
        let _ = handle.wait().unwrap();
    }

    #[tokio::test]
    async fn create_failure_surfaces_through_wait() {
        let source = MockChunkSource::new(vec![vec![0i16; 4000]]);
        let factory = MockRecognizerFactory::silent().with_create_failure();
        let transcriber = StreamingTranscriber::new(factory, SAMPLE_RATE);

        let (mut rx, handle) = spawn_session(source, transcriber, CancelToken::new());
        while rx.recv().await.is_some() {}

        assert!(matches!(
            handle.wait(),
            Err(ScribeError::ModelNotFound { .. })
        ));
    }
}
