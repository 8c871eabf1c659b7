use super::*;
use crate::effects::transitions::TransitionKind;
use crate::encode::artifact::{Container, ReelArtifact};
use crate::encode::sink::InMemorySink;
use crate::render::backend::FrameRGBA;

fn solid(r: u8, g: u8, b: u8) -> ReelImage {
    ReelImage::from_rgba8("solid", 2, 4, [r, g, b, 255].repeat(8)).unwrap()
}

fn tiny_settings(spi: f64) -> ReelSettings {
    ReelSettings {
        seconds_per_image: spi,
        transition: TransitionKind::Fade,
        quality: Quality::Custom {
            width: 8,
            height: 16,
            bitrate_kbps: 100,
        },
        ..ReelSettings::default()
    }
}

fn request(images: Vec<ReelImage>, spi: f64) -> ReelRequest {
    ReelRequest::new(
        ImageSnapshot::from(images),
        Quote::new("Less is more.", "Mies"),
        tiny_settings(spi),
    )
}

fn rgb3() -> Vec<ReelImage> {
    vec![solid(255, 0, 0), solid(0, 255, 0), solid(0, 0, 255)]
}

/// Sink that records pushes and can be told to fail or cancel at a given frame.
#[derive(Default)]
struct ScriptedSink {
    inner: InMemorySink,
    fail_begin: Vec<u32>,
    fail_push_at: Option<u64>,
    cancel_at: Option<(u64, CancelToken)>,
    begun_widths: Vec<u32>,
    aborted: bool,
}

impl FrameSink for ScriptedSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.begun_widths.push(cfg.width);
        if self.fail_begin.contains(&cfg.width) {
            return Err(ReelError::encoder_init("profile refused"));
        }
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        if self.fail_push_at == Some(idx.0) {
            return Err(ReelError::encoder_submit("encoder rejected frame"));
        }
        self.inner.push_frame(idx, frame)?;
        if let Some((at, token)) = &self.cancel_at
            && *at == idx.0
        {
            token.cancel();
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<ReelArtifact> {
        self.inner.end()
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.inner.abort();
    }
}

#[test]
fn renders_every_frame_in_order() {
    let req = request(rgb3(), 1.0);
    let mut sink = InMemorySink::new();
    let mut events = Vec::new();
    let outcome = EncodingPipeline::default().run(&req, &mut sink, &mut |e| events.push(e));

    let artifact = outcome.into_artifact().unwrap();
    assert_eq!(artifact.container, Container::RawRgba);
    assert_eq!(sink.frames().len(), 90);
    assert!(
        sink.frames()
            .iter()
            .enumerate()
            .all(|(i, (idx, _))| idx.0 == i as u64)
    );
    assert_eq!(sink.config().unwrap().width, 8);
    assert_eq!(artifact.len(), 90 * 8 * 16 * 4);

    let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(events.last().unwrap().state, JobState::Done);
    assert_eq!(events.last().unwrap().percent, 100);
    assert!(
        events
            .iter()
            .filter(|e| e.state != JobState::Done)
            .all(|e| e.percent < 100)
    );
}

#[test]
fn one_image_is_insufficient() {
    let req = request(vec![solid(255, 0, 0)], 1.0);
    let mut sink = ScriptedSink::default();
    let outcome = EncodingPipeline::default().run(&req, &mut sink, &mut |_| {});
    assert!(matches!(
        outcome,
        JobOutcome::Failed(ReelError::InsufficientImages { count: 1, min: 2 })
    ));
    assert!(sink.begun_widths.is_empty(), "sink must not be opened");
}

#[test]
fn more_than_max_images_is_rejected_before_the_sink_opens() {
    let images = (0..MAX_IMAGES + 5).map(|_| solid(9, 9, 9)).collect();
    let mut sink = ScriptedSink::default();
    let outcome = EncodingPipeline::default().run(&request(images, 0.1), &mut sink, &mut |_| {});
    assert!(matches!(
        outcome,
        JobOutcome::Failed(ReelError::CollectionFull { max: MAX_IMAGES })
    ));
    assert!(sink.begun_widths.is_empty());
}

#[test]
fn sub_frame_duration_fails_instead_of_finishing_empty() {
    let mut sink = ScriptedSink::default();
    let mut events = Vec::new();
    let outcome =
        EncodingPipeline::default().run(&request(rgb3(), 0.001), &mut sink, &mut |e| events.push(e));
    assert!(matches!(outcome, JobOutcome::Failed(ReelError::Validation(_))));
    assert!(sink.begun_widths.is_empty());
    assert!(events.iter().all(|e| e.state != JobState::Done));
}

#[test]
fn encoded_images_are_not_left_decoded_after_a_run() {
    let png = |rgba: [u8; 4]| {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 8, image::Rgba(rgba)))
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    };
    let images = vec![
        ReelImage::from_bytes("a.png", png([200, 0, 0, 255])),
        ReelImage::from_bytes("b.png", png([0, 0, 200, 255])),
    ];
    let req = request(images.clone(), 0.5);
    let mut sink = InMemorySink::new();
    let outcome = EncodingPipeline::default().run(&req, &mut sink, &mut |_| {});
    assert!(matches!(outcome, JobOutcome::Done(_)));
    assert_eq!(sink.frames().len(), 30);
    assert!(images.iter().all(|img| !img.is_decoded()));
    // Both images were drawn.
    let first = sink.frames()[0].1.pixel(4, 8).unwrap();
    let second = sink.frames()[20].1.pixel(4, 8).unwrap();
    assert!(first[0] > first[2] && second[2] > second[0], "{first:?} {second:?}");
}

#[test]
fn cancel_mid_run_freezes_progress_and_discards_output() {
    let pipeline = EncodingPipeline::default();
    let mut sink = ScriptedSink {
        cancel_at: Some((39, pipeline.cancel_token().clone())),
        ..ScriptedSink::default()
    };
    let mut events = Vec::new();
    let outcome = pipeline.run(&request(rgb3(), 1.0), &mut sink, &mut |e| events.push(e));

    match outcome {
        JobOutcome::Cancelled { progress_percent } => assert_eq!(progress_percent, 43),
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(sink.aborted);
    assert!(sink.inner.frames().is_empty());
    let last = events.last().unwrap();
    assert_eq!(last.state, JobState::Cancelled);
    assert_eq!(last.percent, 43);
}

#[test]
fn submit_failure_fails_job_and_aborts_sink() {
    let mut sink = ScriptedSink {
        fail_push_at: Some(5),
        ..ScriptedSink::default()
    };
    let outcome = EncodingPipeline::default().run(&request(rgb3(), 1.0), &mut sink, &mut |_| {});
    assert!(matches!(outcome, JobOutcome::Failed(ReelError::EncoderSubmit(_))));
    assert!(sink.aborted);
}

#[test]
fn decode_failure_names_the_image() {
    let images = vec![
        solid(255, 0, 0),
        ReelImage::from_bytes("broken.png", b"not an image".to_vec()),
    ];
    let mut sink = ScriptedSink::default();
    let outcome = EncodingPipeline::default().run(&request(images, 1.0), &mut sink, &mut |_| {});
    match outcome {
        JobOutcome::Failed(ReelError::ImageDecode { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected decode failure, got {other:?}"),
    }
    // The failure hits when the first transition window needs image 1.
    assert!(sink.aborted);
    assert!(sink.inner.was_aborted());
}

#[test]
fn profile_fallback_steps_down_from_4k() {
    let mut req = request(rgb3(), 0.3);
    req.settings.quality = Quality::Uhd4k;
    let mut sink = ScriptedSink {
        fail_begin: vec![2160],
        ..ScriptedSink::default()
    };
    let pipeline = EncodingPipeline::new(PipelineOpts {
        allow_profile_fallback: true,
        ..PipelineOpts::default()
    });
    // Cancel right away: only the negotiated profile matters here.
    pipeline.cancel_token().cancel();
    let outcome = pipeline.run(&req, &mut sink, &mut |_| {});
    assert!(matches!(outcome, JobOutcome::Cancelled { progress_percent: 0 }));
    assert_eq!(sink.begun_widths, vec![2160, 1080]);
    assert_eq!(sink.inner.config().unwrap().quality_label, "hd");
}

#[test]
fn init_failure_without_fallback_is_terminal() {
    let mut req = request(rgb3(), 1.0);
    req.settings.quality = Quality::Uhd4k;
    let mut sink = ScriptedSink {
        fail_begin: vec![2160],
        ..ScriptedSink::default()
    };
    let outcome = EncodingPipeline::default().run(&req, &mut sink, &mut |_| {});
    assert!(matches!(outcome, JobOutcome::Failed(ReelError::EncoderInit(_))));
    assert_eq!(sink.begun_widths, vec![2160]);
}

#[test]
fn realtime_pacing_takes_about_playback_time() {
    let req = request(vec![solid(255, 0, 0), solid(0, 0, 255)], 0.1);
    let pipeline = EncodingPipeline::new(PipelineOpts {
        pacing: Pacing::RealTime,
        ..PipelineOpts::default()
    });
    let mut sink = InMemorySink::new();
    let start = std::time::Instant::now();
    let outcome = pipeline.run(&req, &mut sink, &mut |_| {});
    assert!(matches!(outcome, JobOutcome::Done(_)));
    assert_eq!(sink.frames().len(), 6);
    assert!(start.elapsed() >= std::time::Duration::from_millis(150));
}

#[test]
fn spawned_job_reports_progress_and_joins() {
    let handle = spawn_encoding_job(
        request(rgb3(), 0.5),
        InMemorySink::new(),
        PipelineOpts::default(),
    );
    let outcome = handle.join();
    assert!(matches!(outcome, JobOutcome::Done(_)));
}

#[test]
fn spawned_job_can_be_cancelled() {
    let handle = spawn_encoding_job(
        request(rgb3(), 5.0),
        InMemorySink::new(),
        PipelineOpts {
            pacing: Pacing::RealTime,
            ..PipelineOpts::default()
        },
    );
    // Wait until rendering has started, then cancel.
    loop {
        let ev = handle.progress().recv().unwrap();
        if ev.state == JobState::Rendering {
            break;
        }
    }
    handle.cancel();
    let outcome = handle.join();
    assert_eq!(outcome.state(), JobState::Cancelled);
}
