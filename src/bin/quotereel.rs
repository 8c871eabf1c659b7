use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use quotereel::{
    BatchSink, FfmpegSink, FfmpegSinkOpts, FontFace, FrameCompositor, FrameIndex, FrameSink,
    InMemorySink, JobOutcome, JobState, LoadedReel, Pacing, PipelineOpts, Quality, ReelManifest,
    ReelRequest, ReelTimeline, TransitionKind, VideoCodec, find_system_font, spawn_encoding_job,
};

#[derive(Parser, Debug)]
#[command(name = "quotereel", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the reel to a video (requires `ffmpeg` on PATH unless `--codec raw`).
    Render(RenderArgs),
    /// Print the frame schedule of a manifest as JSON.
    Info(InfoArgs),
}

/// Overrides applied on top of the manifest's `settings`.
#[derive(clap::Args, Debug, Default)]
struct SettingsOverrides {
    /// Transition style: default, fade, slide, zoom or cut.
    #[arg(long)]
    transition: Option<TransitionKind>,

    /// Seconds each image stays on screen.
    #[arg(long)]
    seconds_per_image: Option<f64>,

    /// Output profile.
    #[arg(long, value_enum)]
    quality: Option<QualityArg>,

    /// Font file for quote, author and watermark text.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input reel manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    overrides: SettingsOverrides,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input reel manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the artifact is written into.
    #[arg(long)]
    out_dir: PathBuf,

    /// Output codec.
    #[arg(long, value_enum, default_value_t = CodecArg::Vp9)]
    codec: CodecArg,

    /// Output frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Pace frames at playback speed instead of rendering flat out.
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Fall back to a lower profile when the encoder refuses the requested one.
    #[arg(long, default_value_t = false)]
    fallback: bool,

    /// Buffer every frame and encode in one pass at the end.
    #[arg(long, default_value_t = false)]
    batch: bool,

    #[command(flatten)]
    overrides: SettingsOverrides,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input reel manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame rate used for the schedule.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    #[command(flatten)]
    overrides: SettingsOverrides,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityArg {
    Hd,
    #[value(name = "4k")]
    Uhd4k,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CodecArg {
    /// VP9 in WebM.
    Vp9,
    /// H.264 in MP4.
    H264,
    /// Concatenated raw RGBA frames, no ffmpeg needed.
    Raw,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

fn load_reel(in_path: &Path, overrides: &SettingsOverrides) -> anyhow::Result<LoadedReel> {
    let mut manifest = ReelManifest::from_path(in_path)?;
    if let Some(t) = overrides.transition {
        manifest.settings.transition = t;
    }
    if let Some(spi) = overrides.seconds_per_image {
        manifest.settings.seconds_per_image = spi;
    }
    if let Some(q) = overrides.quality {
        manifest.settings.quality = match q {
            QualityArg::Hd => Quality::Hd,
            QualityArg::Uhd4k => Quality::Uhd4k,
        };
    }
    if let Some(font) = &overrides.font {
        // Resolved against the working directory, unlike manifest-relative paths.
        manifest.style.font = Some(std::path::absolute(font).context("resolve font path")?);
    }
    let base_dir = in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut reel = manifest.load(base_dir)?;
    if reel.font.is_none()
        && let Some(path) = find_system_font()
    {
        tracing::debug!(font = %path.display(), "no font configured, using system font");
        reel.font = Some(FontFace::from_path(&path)?);
    }
    Ok(reel)
}

fn request_from(reel: LoadedReel) -> ReelRequest {
    ReelRequest::new(reel.collection.snapshot(), reel.quote, reel.settings)
        .with_style(reel.style)
        .with_font(reel.font)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let reel = load_reel(&args.in_path, &args.overrides)?;
    reel.collection.ensure_ready_for_encoding()?;
    let timeline = ReelTimeline::new(
        reel.collection.len(),
        &reel.settings,
        PipelineOpts::default().fps,
    )?;
    if args.frame >= timeline.total_frames() {
        anyhow::bail!(
            "frame {} is past the end of the reel ({} frames)",
            args.frame,
            timeline.total_frames()
        );
    }

    let sample = timeline.sample(FrameIndex(args.frame));
    let req = request_from(reel);
    let mut compositor = FrameCompositor::new(
        req.settings.quality.canvas()?,
        &req.settings,
        req.quote.clone(),
        req.style.clone(),
        req.font.as_ref(),
    )?;
    let image = req
        .images
        .get(sample.image_index)
        .context("sampled image index out of range")?;
    let next = sample.next_index.and_then(|i| req.images.get(i));
    let frame = compositor.render_frame(image, sample.transition_progress, next)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let reel = load_reel(&args.in_path, &args.overrides)?;
    let req = request_from(reel);
    let opts = PipelineOpts {
        fps: quotereel::Fps::new(args.fps, 1)?,
        pacing: if args.realtime {
            Pacing::RealTime
        } else {
            Pacing::Unpaced
        },
        allow_profile_fallback: args.fallback,
    };

    let sink: Box<dyn FrameSink> = match args.codec {
        CodecArg::Raw => Box::new(InMemorySink::new()),
        CodecArg::Vp9 => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(VideoCodec::Vp9))),
        CodecArg::H264 => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(VideoCodec::H264))),
    };
    let sink: Box<dyn FrameSink> = if args.batch {
        Box::new(BatchSink::new(sink))
    } else {
        sink
    };

    let handle = spawn_encoding_job(req, sink, opts);
    let mut last_decile = None;
    // The channel closes when the job thread finishes.
    for ev in handle.progress().iter() {
        let decile = ev.percent / 10;
        if ev.state != JobState::Rendering || last_decile != Some(decile) {
            tracing::info!(state = ?ev.state, percent = ev.percent, "progress");
            last_decile = Some(decile);
        }
    }

    match handle.join() {
        JobOutcome::Done(artifact) => {
            let path = artifact.write_to_dir(&args.out_dir)?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        JobOutcome::Failed(e) => Err(e.into()),
        JobOutcome::Cancelled { progress_percent } => {
            anyhow::bail!("render cancelled at {progress_percent}%")
        }
    }
}

#[derive(serde::Serialize)]
struct ScheduleInfo {
    images: usize,
    fps: u32,
    total_frames: u64,
    frames_per_image: u64,
    transition_frames: u64,
    duration_secs: f64,
    transition: &'static str,
    quality: String,
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let reel = load_reel(&args.in_path, &args.overrides)?;
    let timeline = ReelTimeline::new(
        reel.collection.len(),
        &reel.settings,
        quotereel::Fps::new(args.fps, 1)?,
    )?;
    let info = ScheduleInfo {
        images: timeline.image_count(),
        fps: args.fps,
        total_frames: timeline.total_frames(),
        frames_per_image: timeline.frames_per_image(),
        transition_frames: timeline.transition_frames(),
        duration_secs: timeline.duration_secs(),
        transition: reel.settings.transition.name(),
        quality: reel.settings.quality.label(),
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    // The schedule is printed even for a reel the pipeline would reject.
    reel.collection.ensure_ready_for_encoding()?;
    Ok(())
}
