//! Line-oriented code reader.
//!
//! Handheld QR scanners usually present themselves as a keyboard: each scan
//! arrives as one line of text. [`LineCamera`] treats every line as a frame.
//! A blank line is a frame with no code in view.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

use super::{Camera, CameraConstraints, CameraStream, Facing, Frame};
use crate::error::{Error, Result};

/// Message reported for a frame with no code in view.
pub const NO_CODE_IN_FRAME: &str = "No QR code found in frame";

/// A camera backed by lines of text from an async reader.
///
/// The reader is handed to the first stream opened; the device is then in
/// use until the process exits.
#[derive(Debug)]
pub struct LineCamera<R> {
    reader: Option<R>,
    facing: Facing,
}

impl LineCamera<BufReader<Stdin>> {
    /// A reader on standard input.
    ///
    /// Reading stdin blocks a runtime thread; a pending read cannot be
    /// interrupted, only abandoned.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineCamera<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    /// Wrap `reader`. Handheld readers are pointed away from the operator,
    /// so the device reports itself as rear-facing.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            facing: Facing::Environment,
        }
    }
}

#[async_trait::async_trait]
impl<R> Camera for LineCamera<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "line"
    }

    async fn open(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>> {
        if constraints.facing != self.facing {
            return Err(Error::camera_unavailable(format!(
                "no {} camera found",
                constraints.facing
            )));
        }

        let reader = self
            .reader
            .take()
            .ok_or_else(|| Error::camera_unavailable("line reader is already in use"))?;

        debug!("Line reader opened");
        Ok(Box::new(LineStream {
            lines: Some(reader.lines()),
        }))
    }
}

/// A live stream over the reader's lines.
struct LineStream<R> {
    lines: Option<Lines<R>>,
}

#[async_trait::async_trait]
impl<R> CameraStream for LineStream<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn read_frame(&mut self) -> Frame {
        let Some(lines) = self.lines.as_mut() else {
            return Frame::Ended;
        };

        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => Frame::Miss(NO_CODE_IN_FRAME.to_string()),
            Ok(Some(line)) => Frame::Decoded(line),
            Ok(None) => Frame::Ended,
            Err(e) => {
                warn!(error = %e, "Line reader failed");
                self.lines = None;
                Frame::Ended
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.lines = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(input: &'static str) -> LineCamera<&'static [u8]> {
        LineCamera::new(input.as_bytes())
    }

    #[tokio::test]
    async fn test_lines_become_frames() {
        let mut camera = camera("BLDG-A-LOBBY\n\n  bldg-b-roof \n");
        let mut stream = camera.open(&CameraConstraints::default()).await.unwrap();

        assert_eq!(
            stream.read_frame().await,
            Frame::Decoded("BLDG-A-LOBBY".to_string())
        );
        assert_eq!(
            stream.read_frame().await,
            Frame::Miss(NO_CODE_IN_FRAME.to_string())
        );
        // Text is passed through untouched
        assert_eq!(
            stream.read_frame().await,
            Frame::Decoded("  bldg-b-roof ".to_string())
        );
        assert_eq!(stream.read_frame().await, Frame::Ended);
    }

    #[tokio::test]
    async fn test_front_facing_request_is_unavailable() {
        let mut camera = camera("BLDG-A-LOBBY\n");
        let constraints = CameraConstraints {
            facing: Facing::User,
        };
        let err = camera.open(&constraints).await.err().unwrap();
        assert!(err.is_camera_unavailable());
        assert!(err.to_string().contains("front-facing"));
    }

    #[tokio::test]
    async fn test_reader_is_exclusive() {
        let mut camera = camera("BLDG-A-LOBBY\n");
        let _stream = camera.open(&CameraConstraints::default()).await.unwrap();
        let err = camera
            .open(&CameraConstraints::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("already in use"));
    }

    #[tokio::test]
    async fn test_stopped_stream_ends() {
        let mut camera = camera("BLDG-A-LOBBY\n");
        let mut stream = camera.open(&CameraConstraints::default()).await.unwrap();
        stream.stop().await.unwrap();
        assert_eq!(stream.read_frame().await, Frame::Ended);
    }
}
