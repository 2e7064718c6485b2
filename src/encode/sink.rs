use std::path::PathBuf;

use crate::foundation::buffer::ImageBuffer;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StudioError, StudioResult};

/// Configuration provided to an [`EncoderSink`] when a generation starts.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Planned output length in frames.
    pub total_frames: u64,
    /// Optional audio track muxed next to the video.
    pub audio: Option<AudioTrack>,
}

impl SinkConfig {
    /// Planned output length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames)
    }
}

/// Audio file to mux into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    /// Path to any audio container `ffmpeg` can read.
    pub path: PathBuf,
    /// Decoded duration in seconds.
    pub duration_secs: f64,
}

/// What a sink produced once finalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkSummary {
    /// Frames accepted before finalization.
    pub frames_written: u64,
}

/// Consumer of composited frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameIndex`] order.
pub trait EncoderSink: Send {
    /// Check that everything the sink needs exists on this host. Called before `begin`.
    fn probe(&self) -> StudioResult<()> {
        Ok(())
    }
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &ImageBuffer) -> StudioResult<()>;
    /// Finalize whatever was captured.
    fn end(&mut self) -> StudioResult<SinkSummary>;
    /// Discard the output after a cancellation or failure.
    fn abort(&mut self);
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, ImageBuffer)>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, ImageBuffer)] {
        &self.frames
    }

    /// `true` once `end` succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `true` once `abort` was called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl EncoderSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &ImageBuffer) -> StudioResult<()> {
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(StudioError::encoder("in-memory sink received out-of-order frame"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StudioResult<SinkSummary> {
        self.finished = true;
        Ok(SinkSummary {
            frames_written: self.frames.len() as u64,
        })
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
