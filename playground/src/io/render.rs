//! Frame sinks for the redraw loop.

use std::io::Write;

use tracing::warn;

use crate::view::Frame;

/// Receives every frame the session draws.
///
/// Drawing may happen arbitrarily often; implementations must not assume a
/// frame differs from the previous one.
pub trait Renderer: Send {
    fn draw(&mut self, frame: &Frame);

    /// Forget what was last drawn so the next frame is written in full.
    fn invalidate(&mut self) {}
}

/// Writes frames as text, skipping frames equal to the last one written.
pub struct TextRenderer<W> {
    out: W,
    last: Option<Frame>,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn draw(&mut self, frame: &Frame) {
        if self.last.as_ref() == Some(frame) {
            return;
        }
        let written = write!(self.out, "{frame}").and_then(|()| self.out.flush());
        if let Err(err) = written {
            warn!(error = %err, "failed to draw frame");
            return;
        }
        self.last = Some(frame.clone());
    }

    fn invalidate(&mut self) {
        self.last = None;
    }
}
