use crate::encode::artifact::{Container, ReelArtifact};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Target video bitrate.
    pub bitrate_kbps: u32,
    /// Quality tag used in the artifact file name.
    pub quality_label: String,
}

/// Encoder backend contract.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. Exactly
/// one of `end` or `abort` closes a sink that was successfully begun; `abort` must release every
/// resource and leave no partial output behind.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed. Failures are encoder-init failures.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Finalize and hand back the encoded artifact.
    fn end(&mut self) -> ReelResult<ReelArtifact>;
    /// Discard everything produced so far.
    fn abort(&mut self);
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> ReelResult<ReelArtifact> {
        (**self).end()
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}

/// In-memory sink for tests and debugging.
///
/// The artifact it produces is the raw frame stream.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Return `true` if the last run was aborted.
    pub fn was_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoder_submit("in-memory sink not started"))?;
        check_frame(cfg, frame)?;
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(ReelError::encoder_submit("out-of-order frame index"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<ReelArtifact> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoder_submit("in-memory sink not started"))?;
        let bytes: Vec<u8> = self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data.iter().copied())
            .collect();
        Ok(ReelArtifact::new(&cfg.quality_label, Container::RawRgba, bytes))
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.aborted = true;
    }
}

/// Batch encoder strategy: buffer every frame, then replay them into `inner` at full speed
/// when the run ends.
///
/// Trades memory (every frame is retained) for decoupling the encoder from rendering speed.
pub struct BatchSink<S> {
    inner: S,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    cfg: Option<SinkConfig>,
}

impl<S: FrameSink> BatchSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            frames: Vec::new(),
            cfg: None,
        }
    }

    /// Number of frames waiting to be replayed.
    pub fn buffered(&self) -> usize {
        self.frames.len()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSink> FrameSink for BatchSink<S> {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.inner.begin(cfg.clone())?;
        self.frames.clear();
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoder_submit("batch sink not started"))?;
        check_frame(cfg, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<ReelArtifact> {
        let frames = std::mem::take(&mut self.frames);
        tracing::debug!(frames = frames.len(), "replaying buffered frames");
        for (idx, frame) in &frames {
            if let Err(e) = self.inner.push_frame(*idx, frame) {
                self.inner.abort();
                return Err(e);
            }
        }
        self.cfg = None;
        self.inner.end()
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.cfg = None;
        self.inner.abort();
    }
}

fn check_frame(cfg: &SinkConfig, frame: &FrameRGBA) -> ReelResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(ReelError::encoder_submit(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
