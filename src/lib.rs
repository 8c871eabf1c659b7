//! quotereel renders "quote reels": an ordered set of background images cycled with
//! transitions, overlaid with a gradient, a word-wrapped quote, its author and a watermark, and
//! encoded into one downloadable video.
//!
//! The public API is job-oriented:
//!
//! - Build an [`ImageCollection`] and freeze it with [`ImageCollection::snapshot`]
//! - Describe the run with a [`ReelRequest`] (quote, [`ReelSettings`], style, font)
//! - Drive an [`EncodingPipeline`] into a [`FrameSink`], or [`spawn_encoding_job`] on a thread
//! - Receive a terminal [`JobOutcome`], which carries the [`ReelArtifact`] on success
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod animation;
pub(crate) mod effects;
/// Encoding sinks.
pub mod encode;
pub(crate) mod eval;
pub(crate) mod render;
pub(crate) mod scene;
/// Job-oriented encoding API.
pub mod session;
pub(crate) mod text;

pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Rect, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::assets::font::{FontFace, FontMeasure, TextLayoutEngine, find_system_font};
pub use crate::assets::image::{ImageId, ReelImage};
pub use crate::effects::transitions::{
    CompositeInstruction, ImageDraw, Layer, Transition, TransitionKind,
};
pub use crate::encode::artifact::{Container, ReelArtifact};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoCodec, is_ffmpeg_on_path};
pub use crate::encode::sink::{BatchSink, FrameSink, InMemorySink, SinkConfig};
pub use crate::eval::timeline::{FrameSample, ReelTimeline};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::compositor::FrameCompositor;
pub use crate::render::placement::CoverFit;
pub use crate::scene::collection::{
    Direction, ImageCollection, ImageSnapshot, MAX_IMAGES, MIN_IMAGES,
};
pub use crate::scene::manifest::{LoadedReel, ManifestStyle, ReelManifest};
pub use crate::scene::quote::Quote;
pub use crate::scene::settings::{
    OverlayLayout, OverlayStyle, PRESET_SECONDS_PER_IMAGE, Quality, ReelSettings,
};
pub use crate::session::job::{CancelToken, EncodingJob, JobOutcome, JobState, ProgressEvent};
pub use crate::session::pipeline::{
    EncodingPipeline, JobHandle, Pacing, PipelineOpts, ReelRequest, spawn_encoding_job,
};
pub use crate::session::preview::{PreviewClock, TickFn};
pub use crate::text::wrap::{TextBlock, wrap};
