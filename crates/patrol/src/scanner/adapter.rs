//! The scanning session task and its owner-side handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{
    Camera, CameraConstraints, CameraStream, Frame, ScannerEvent, ScannerOptions, ScannerState,
    StateCell,
};

/// Owner-side handle to a running scanning session.
///
/// Dropping the handle cancels the session; the session task then releases
/// the camera on its own. Use [`ScannerHandle::teardown`] to wait for the
/// release to finish.
#[derive(Debug)]
pub struct ScannerHandle {
    state: StateCell,
    cancel: CancellationToken,
    decoded_once: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl ScannerHandle {
    /// Start a scanning session on `camera`.
    ///
    /// Events are delivered on `events`. Must be called from within a tokio
    /// runtime.
    #[must_use]
    pub fn start(
        camera: Box<dyn Camera>,
        options: ScannerOptions,
        events: mpsc::Sender<ScannerEvent>,
    ) -> Self {
        let session = Session {
            state: StateCell::new(),
            cancel: CancellationToken::new(),
            decoded_once: Arc::new(AtomicBool::new(false)),
            options,
            events,
        };

        let state = session.state.clone();
        let cancel = session.cancel.clone();
        let decoded_once = Arc::clone(&session.decoded_once);
        let task = tokio::spawn(session.run(camera));

        Self {
            state,
            cancel,
            decoded_once,
            task: Some(task),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ScannerState {
        self.state.get()
    }

    /// Whether teardown has begun.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether a code has been decoded in this session.
    #[must_use]
    pub fn has_decoded(&self) -> bool {
        self.decoded_once.load(Ordering::SeqCst)
    }

    /// Cancel the session and wait until the camera has been released.
    ///
    /// No event is delivered once this has been called.
    pub async fn teardown(mut self) {
        debug!(state = %self.state(), "Tearing down scanner");
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Scanner task ended abnormally");
            }
        }
    }
}

impl Drop for ScannerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Task-side state of one scanning session.
struct Session {
    state: StateCell,
    cancel: CancellationToken,
    decoded_once: Arc<AtomicBool>,
    options: ScannerOptions,
    events: mpsc::Sender<ScannerEvent>,
}

impl Session {
    async fn run(self, mut camera: Box<dyn Camera>) {
        let name = camera.name();
        let constraints = CameraConstraints {
            facing: self.options.facing,
        };

        self.state.set(ScannerState::Starting);
        debug!(camera = name, facing = %constraints.facing, "Acquiring camera");

        let opened = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!(camera = name, "Cancelled while acquiring camera");
                self.state.set(ScannerState::Stopped);
                return;
            }
            opened = camera.open(&constraints) => opened,
        };

        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                warn!(camera = name, error = %e, "Camera unavailable");
                self.state.set(ScannerState::Errored);
                self.deliver(ScannerEvent::CameraUnavailable(e.to_string()))
                    .await;
                return;
            }
        };

        self.state.set(ScannerState::Running);
        debug!(
            camera = name,
            fps = self.options.fps,
            "Camera live, decoding frames"
        );

        self.decode_frames(stream.as_mut()).await;
        release(name, stream.as_mut()).await;

        if self.state.get() != ScannerState::Decoded {
            self.state.set(ScannerState::Stopped);
        }
        debug!(camera = name, state = %self.state.get(), "Scanner session finished");
    }

    /// Decode frames at the configured rate until a decode, the end of the
    /// stream, cancellation, or the owner going away.
    async fn decode_frames(&self, stream: &mut dyn CameraStream) {
        let mut ticker = interval(self.options.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let frame = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return,
                frame = async {
                    ticker.tick().await;
                    stream.read_frame().await
                } => frame,
            };

            match frame {
                Frame::Decoded(text) => {
                    // A second decode racing the stop must never reach the owner
                    if self.decoded_once.swap(true, Ordering::SeqCst) {
                        trace!("Ignoring decode after the first");
                        continue;
                    }
                    debug!(len = text.len(), "Code decoded");
                    self.state.set(ScannerState::Decoded);
                    self.deliver(ScannerEvent::Decoded(text)).await;
                    return;
                }
                Frame::Miss(reason) => {
                    trace!(%reason, "Decode miss");
                    if self.options.report_frame_errors
                        && !self.deliver(ScannerEvent::FrameError(reason)).await
                    {
                        return;
                    }
                }
                Frame::Ended => {
                    debug!("Camera stream ended");
                    return;
                }
            }
        }
    }

    /// Deliver an event unless teardown has begun.
    ///
    /// Returns `false` if the event was suppressed or the owner is gone.
    async fn deliver(&self, event: ScannerEvent) -> bool {
        if self.cancel.is_cancelled() {
            trace!(?event, "Suppressing event after teardown");
            return false;
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                trace!("Suppressing event after teardown");
                false
            }
            sent = self.events.send(event) => {
                if sent.is_err() {
                    debug!("Event receiver dropped");
                }
                sent.is_ok()
            }
        }
    }
}

/// Best-effort stop; failures are logged and swallowed.
async fn release(name: &'static str, stream: &mut dyn CameraStream) {
    match stream.stop().await {
        Ok(()) => debug!(camera = name, "Camera released"),
        Err(e) => warn!(camera = name, error = %e, "Failed to stop camera cleanly"),
    }
}
