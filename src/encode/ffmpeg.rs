use crate::encode::artifact::{Container, ReelArtifact};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Output codec of an [`FfmpegSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    /// VP9 in a WebM container.
    #[default]
    Vp9,
    /// H.264 in an MP4 container.
    H264,
}

impl VideoCodec {
    pub fn container(self) -> Container {
        match self {
            Self::Vp9 => Container::WebM,
            Self::H264 => Container::Mp4,
        }
    }

    fn encoder_name(self) -> &'static str {
        match self {
            Self::Vp9 => "libvpx-vp9",
            Self::H264 => "libx264",
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub codec: VideoCodec,
    /// Directory for the staging file ffmpeg writes into. Removed once the artifact is read back.
    pub staging_dir: PathBuf,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Program to invoke.
    pub ffmpeg_bin: PathBuf,
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            codec: VideoCodec::default(),
            staging_dir: std::env::temp_dir(),
            bg_rgba: [0, 0, 0, 255],
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegSinkOpts {
    pub fn new(codec: VideoCodec) -> Self {
        Self {
            codec,
            ..Self::default()
        }
    }
}

/// Sink that spawns `ffmpeg` and streams raw frames to its stdin.
///
/// The encoded stream lands in a staging file; `end` reads it back into a [`ReelArtifact`]
/// and removes the file, `abort` kills the process and removes whatever was written.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    staging_path: Option<PathBuf>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            staging_path: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Path of the in-progress staging file, if a run is open.
    pub fn staging_path(&self) -> Option<&Path> {
        self.staging_path.as_deref()
    }

    fn build_command(&self, cfg: &SinkConfig, out: &Path) -> Command {
        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input is flattened opaque RGBA8 (see push_frame).
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);

        let bitrate = format!("{}k", cfg.bitrate_kbps);
        cmd.args(["-c:v", self.opts.codec.encoder_name(), "-b:v", &bitrate]);
        match self.opts.codec {
            VideoCodec::Vp9 => {
                cmd.args([
                    "-deadline",
                    "realtime",
                    "-cpu-used",
                    "8",
                    "-row-mt",
                    "1",
                    "-pix_fmt",
                    "yuv420p",
                    "-f",
                    "webm",
                ]);
            }
            VideoCodec::H264 => {
                cmd.args([
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                    "-f",
                    "mp4",
                ]);
            }
        }
        cmd.arg(out);
        cmd
    }

    fn reap(&mut self) -> ReelResult<(std::process::ExitStatus, Vec<u8>)> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encoder_submit("ffmpeg sink not started"))?;
        let status = child.wait().map_err(|e| {
            ReelError::encoder_submit(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encoder_submit("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encoder_submit(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        Ok((status, stderr_bytes))
    }

    fn remove_staging(&mut self) {
        if let Some(path) = self.staging_path.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staging file");
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::encoder_init(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::encoder_init(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if cfg.bitrate_kbps == 0 {
            return Err(ReelError::encoder_init("bitrate must be non-zero"));
        }
        if !is_ffmpeg_available(&self.opts.ffmpeg_bin) {
            return Err(ReelError::encoder_init(format!(
                "'{}' was not found or failed to run",
                self.opts.ffmpeg_bin.display()
            )));
        }

        let container = self.opts.codec.container();
        let staging = self.opts.staging_dir.join(format!(
            "quote-reel-staging-{}-{}.{}",
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed),
            container.extension()
        ));
        ensure_parent_dir(&staging).map_err(|e| ReelError::encoder_init(e.to_string()))?;

        let mut child = self.build_command(&cfg, &staging).spawn().map_err(|e| {
            ReelError::encoder_init(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoder_init("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoder_init("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            codec = ?self.opts.codec,
            width = cfg.width,
            height = cfg.height,
            bitrate_kbps = cfg.bitrate_kbps,
            staging = %staging.display(),
            "ffmpeg started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.staging_path = Some(staging);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoder_submit("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encoder_submit(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::encoder_submit(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encoder_submit("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::encoder_submit(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<ReelArtifact> {
        let reaped = self.reap();
        let cfg = self.cfg.take();
        let (status, stderr_bytes) = match reaped {
            Ok(v) => v,
            Err(e) => {
                self.remove_staging();
                return Err(e);
            }
        };
        if !status.success() {
            self.remove_staging();
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encoder_submit(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let path = self
            .staging_path
            .clone()
            .ok_or_else(|| ReelError::encoder_submit("ffmpeg staging file missing"))?;
        let read = std::fs::read(&path);
        self.remove_staging();
        let bytes = read.map_err(|e| {
            ReelError::encoder_submit(format!(
                "failed to read encoded output '{}': {e}",
                path.display()
            ))
        })?;

        let label = cfg.map(|c| c.quality_label).unwrap_or_default();
        Ok(ReelArtifact::new(&label, self.opts.codec.container(), bytes))
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(child) = self.child.as_mut()
            && let Err(e) = child.kill()
        {
            tracing::debug!(error = %e, "ffmpeg kill failed (already exited?)");
        }
        if self.child.is_some()
            && let Err(e) = self.reap()
        {
            tracing::debug!(error = %e, "ffmpeg reap after abort failed");
        }
        self.remove_staging();
        self.cfg = None;
        self.last_idx = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() || self.staging_path.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // `-r` before `-i` sets the rawvideo input rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::encoder_submit(
            "frame buffer length does not match width*height*4",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_ffmpeg_available(Path::new("ffmpeg"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
