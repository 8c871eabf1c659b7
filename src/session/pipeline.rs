use std::sync::mpsc;

use crate::assets::font::FontFace;
use crate::assets::image::ReelImage;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::eval::timeline::ReelTimeline;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compositor::FrameCompositor;
use crate::scene::collection::{ImageSnapshot, MAX_IMAGES, MIN_IMAGES};
use crate::scene::quote::Quote;
use crate::scene::settings::{OverlayStyle, Quality, ReelSettings};
use crate::session::job::{CancelToken, EncodingJob, JobOutcome, JobState, ProgressEvent};

/// How frames are released to the sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Wait one frame interval after each frame, so encoding takes as long as playback.
    RealTime,
    /// Render as fast as the CPU allows.
    #[default]
    Unpaced,
}

/// Per-run pipeline options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOpts {
    pub fps: Fps,
    pub pacing: Pacing,
    /// Retry encoder init with [`Quality::fallback`] when the requested profile is refused.
    pub allow_profile_fallback: bool,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            fps: Fps::whole(30),
            pacing: Pacing::Unpaced,
            allow_profile_fallback: false,
        }
    }
}

/// Everything one encoding run reads.
#[derive(Clone, Debug)]
pub struct ReelRequest {
    pub images: ImageSnapshot,
    pub quote: Quote,
    pub settings: ReelSettings,
    pub style: OverlayStyle,
    pub font: Option<FontFace>,
}

impl ReelRequest {
    pub fn new(images: ImageSnapshot, quote: Quote, settings: ReelSettings) -> Self {
        Self {
            images,
            quote,
            settings,
            style: OverlayStyle::default(),
            font: None,
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_font(mut self, font: Option<FontFace>) -> Self {
        self.font = font;
        self
    }
}

/// Drives one reel from image snapshot to encoded artifact.
///
/// Frames are produced strictly in order on the calling thread and handed to the sink one at a
/// time; the pipeline never retains a frame after submitting it.
#[derive(Clone, Debug, Default)]
pub struct EncodingPipeline {
    opts: PipelineOpts,
    cancel: CancelToken,
}

impl EncodingPipeline {
    pub fn new(opts: PipelineOpts) -> Self {
        Self {
            opts,
            cancel: CancelToken::new(),
        }
    }

    /// Observe `token` instead of a private one.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Encode `req` into `sink`, reporting every state change and progress step.
    #[tracing::instrument(
        skip_all,
        fields(
            images = req.images.len(),
            quality = %req.settings.quality.label(),
            transition = req.settings.transition.name(),
        )
    )]
    pub fn run(
        &self,
        req: &ReelRequest,
        sink: &mut dyn FrameSink,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> JobOutcome {
        let mut job = EncodingJob::new();
        match self.run_inner(req, sink, &mut job, on_progress) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, state = ?job.state(), "encoding failed");
                // Only reached from non-terminal states.
                let _ = job.transition(JobState::Failed);
                on_progress(job.event());
                JobOutcome::Failed(e)
            }
        }
    }

    fn run_inner(
        &self,
        req: &ReelRequest,
        sink: &mut dyn FrameSink,
        job: &mut EncodingJob,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> ReelResult<JobOutcome> {
        let count = req.images.len();
        if count < MIN_IMAGES {
            return Err(ReelError::InsufficientImages {
                count,
                min: MIN_IMAGES,
            });
        }
        if count > MAX_IMAGES {
            return Err(ReelError::CollectionFull { max: MAX_IMAGES });
        }
        let timeline = ReelTimeline::new(count, &req.settings, self.opts.fps)?;

        let quality = self.begin_sink(sink, req.settings.quality)?;
        let canvas = match quality.canvas() {
            Ok(c) => c,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };
        let mut compositor = match FrameCompositor::new(
            canvas,
            &req.settings,
            req.quote.clone(),
            req.style.clone(),
            req.font.as_ref(),
        ) {
            Ok(c) => c,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };

        job.transition(JobState::Rendering)?;
        on_progress(job.event());
        tracing::info!(
            total_frames = timeline.total_frames(),
            frames_per_image = timeline.frames_per_image(),
            transition_frames = timeline.transition_frames(),
            width = canvas.width,
            height = canvas.height,
            "rendering"
        );

        let frame_interval = self.opts.fps.frame_interval();
        for frame in timeline.frames() {
            if self.cancel.is_cancelled() {
                return Ok(self.cancelled(sink, job, on_progress, frame));
            }

            if let Err(e) = self.render_and_submit(&timeline, &req.images, frame, &mut compositor, sink)
            {
                sink.abort();
                return Err(e);
            }

            if job.advance(timeline.progress_percent(frame)) {
                on_progress(job.event());
            }

            if self.opts.pacing == Pacing::RealTime && self.cancel.sleep(frame_interval) {
                return Ok(self.cancelled(sink, job, on_progress, FrameIndex(frame.0 + 1)));
            }
        }

        job.transition(JobState::Finalizing)?;
        on_progress(job.event());
        tracing::info!("finalizing");

        let artifact = sink.end()?;
        job.transition(JobState::Done)?;
        on_progress(job.event());
        tracing::info!(file = %artifact.file_name, bytes = artifact.len(), "done");
        Ok(JobOutcome::Done(artifact))
    }

    /// Open the sink, stepping down the quality ladder on init failure when allowed.
    fn begin_sink(&self, sink: &mut dyn FrameSink, requested: Quality) -> ReelResult<Quality> {
        let mut quality = requested;
        loop {
            let canvas = quality.canvas()?;
            let cfg = SinkConfig {
                width: canvas.width,
                height: canvas.height,
                fps: self.opts.fps,
                bitrate_kbps: quality.bitrate_kbps(),
                quality_label: quality.label(),
            };
            match sink.begin(cfg) {
                Ok(()) => return Ok(quality),
                Err(e) if e.is_encoder_init() && self.opts.allow_profile_fallback => {
                    let Some(lower) = quality.fallback() else {
                        return Err(e);
                    };
                    tracing::warn!(
                        error = %e,
                        from = %quality.label(),
                        to = %lower.label(),
                        "encoder refused profile; falling back"
                    );
                    quality = lower;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn render_and_submit(
        &self,
        timeline: &ReelTimeline,
        images: &ImageSnapshot,
        frame: FrameIndex,
        compositor: &mut FrameCompositor,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<()> {
        let sample = timeline.sample(frame);
        let current = prepared_at(images, sample.image_index, compositor)?;
        let next = sample
            .next_index
            .map(|i| prepared_at(images, i, compositor))
            .transpose()?;

        if frame.0 % timeline.frames_per_image() == 0 {
            tracing::debug!(frame = frame.0, image = sample.image_index, "image slot");
        }

        let rgba = compositor.render_frame(current, sample.transition_progress, next)?;
        sink.push_frame(frame, &rgba)
    }

    fn cancelled(
        &self,
        sink: &mut dyn FrameSink,
        job: &mut EncodingJob,
        on_progress: &mut dyn FnMut(ProgressEvent),
        at: FrameIndex,
    ) -> JobOutcome {
        sink.abort();
        // Cancellation is only observed while rendering.
        let _ = job.transition(JobState::Cancelled);
        on_progress(job.event());
        tracing::info!(frame = at.0, progress = job.progress_percent(), "cancelled");
        JobOutcome::Cancelled {
            progress_percent: job.progress_percent(),
        }
    }
}

/// Look up image `index` and decode it into the compositor's cache, naming the index on failure.
fn prepared_at<'a>(
    images: &'a ImageSnapshot,
    index: usize,
    compositor: &mut FrameCompositor,
) -> ReelResult<&'a ReelImage> {
    let image = images.get(index).ok_or(ReelError::IndexOutOfRange {
        index,
        len: images.len(),
    })?;
    compositor
        .prepare(image)
        .map_err(|e| ReelError::image_decode(index, e.to_string()))?;
    Ok(image)
}

/// Handle to a job running on its own thread.
pub struct JobHandle {
    cancel: CancelToken,
    progress: mpsc::Receiver<ProgressEvent>,
    thread: std::thread::JoinHandle<JobOutcome>,
}

impl JobHandle {
    /// Request cancellation. Observed before the next frame.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Progress events in the order they were reported.
    pub fn progress(&self) -> &mpsc::Receiver<ProgressEvent> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the terminal outcome.
    pub fn join(self) -> JobOutcome {
        self.thread.join().unwrap_or_else(|_| {
            JobOutcome::Failed(ReelError::Other(anyhow::anyhow!("encoding thread panicked")))
        })
    }
}

/// Run the pipeline for `req` on a worker thread.
pub fn spawn_encoding_job<S>(req: ReelRequest, mut sink: S, opts: PipelineOpts) -> JobHandle
where
    S: FrameSink + 'static,
{
    let cancel = CancelToken::new();
    let pipeline = EncodingPipeline::new(opts).with_cancel_token(cancel.clone());
    let (tx, rx) = mpsc::channel();
    let thread = std::thread::spawn(move || {
        pipeline.run(&req, &mut sink, &mut |ev| {
            // The receiver may have been dropped; the job still runs to completion.
            let _ = tx.send(ev);
        })
    });
    JobHandle {
        cancel,
        progress: rx,
        thread,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
