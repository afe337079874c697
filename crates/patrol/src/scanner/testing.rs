//! Scripted camera for lifecycle tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Camera, CameraConstraints, CameraStream, Facing, Frame};
use crate::error::{Error, Result};

/// What the scripted stream does once its frames run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AfterScript {
    /// Report the end of the stream.
    End,
    /// Never produce another frame.
    Hang,
    /// Report a frame with no code in view, forever.
    Miss,
}

/// A camera that replays a fixed list of frames.
#[derive(Debug)]
pub(crate) struct ScriptedCamera {
    frames: Vec<Frame>,
    after: AfterScript,
    facing: Facing,
    open_error: Option<String>,
    hang_open: bool,
    fail_stop: bool,
    stops: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            after: AfterScript::End,
            facing: Facing::Environment,
            open_error: None,
            hang_open: false,
            fail_stop: false,
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn then(mut self, after: AfterScript) -> Self {
        self.after = after;
        self
    }

    pub(crate) fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub(crate) fn failing_open(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }

    /// Never finish opening, as if a permission prompt were left unanswered.
    pub(crate) fn hanging_open(mut self) -> Self {
        self.hang_open = true;
        self
    }

    pub(crate) fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Counter of stop calls, shared with every stream this camera opens.
    pub(crate) fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

#[async_trait::async_trait]
impl Camera for ScriptedCamera {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn open(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>> {
        if self.hang_open {
            std::future::pending::<()>().await;
        }
        if let Some(message) = &self.open_error {
            return Err(Error::camera_unavailable(message.clone()));
        }
        if constraints.facing != self.facing {
            return Err(Error::camera_unavailable(format!(
                "no {} camera found",
                constraints.facing
            )));
        }
        Ok(Box::new(ScriptedStream {
            frames: std::mem::take(&mut self.frames).into(),
            after: self.after,
            fail_stop: self.fail_stop,
            stops: Arc::clone(&self.stops),
        }))
    }
}

struct ScriptedStream {
    frames: VecDeque<Frame>,
    after: AfterScript,
    fail_stop: bool,
    stops: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl CameraStream for ScriptedStream {
    async fn read_frame(&mut self) -> Frame {
        match self.frames.pop_front() {
            Some(frame) => frame,
            None => match self.after {
                AfterScript::End => Frame::Ended,
                AfterScript::Hang => std::future::pending().await,
                AfterScript::Miss => Frame::Miss("no code".to_string()),
            },
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            Err(Error::camera_stop("scripted", "device busy"))
        } else {
            Ok(())
        }
    }
}
