use super::*;
use crate::foundation::core::Canvas;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
        bitrate_kbps: 8_000,
        quality_label: "hd".to_owned(),
    }
}

fn frame(w: u32, h: u32, fill: u8) -> FrameRGBA {
    let canvas = Canvas::new(w, h).unwrap();
    FrameRGBA::from_premul(canvas, vec![fill; canvas.rgba8_len()]).unwrap()
}

#[test]
fn in_memory_sink_captures_frames_and_concatenates() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2, 2)).unwrap();
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().width, 2);

    let artifact = sink.end().unwrap();
    assert_eq!(artifact.container, Container::RawRgba);
    assert_eq!(artifact.len(), 32);
    assert_eq!(&artifact.bytes[..16], &[1; 16]);
    assert_eq!(&artifact.bytes[16..], &[2; 16]);
    assert!(artifact.file_name.starts_with("quote-reel-hd-"));
}

#[test]
fn in_memory_sink_rejects_out_of_order_and_wrong_size() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 2, 0)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(2, 2, 0)).is_err());
    assert!(sink.push_frame(FrameIndex(4), &frame(4, 2, 0)).is_err());
}

#[test]
fn push_before_begin_is_submit_error() {
    let mut sink = InMemorySink::new();
    let err = sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).unwrap_err();
    assert!(matches!(err, ReelError::EncoderSubmit(_)));
}

#[test]
fn abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 9)).unwrap();
    sink.abort();
    assert!(sink.frames().is_empty());
    assert!(sink.was_aborted());
}

#[test]
fn batch_sink_defers_frames_until_end() {
    let mut sink = BatchSink::new(InMemorySink::new());
    sink.begin(cfg(2, 2)).unwrap();
    for i in 0..5 {
        sink.push_frame(FrameIndex(i), &frame(2, 2, i as u8)).unwrap();
    }
    assert_eq!(sink.buffered(), 5);
    assert!(sink.inner().frames().is_empty());

    let artifact = sink.end().unwrap();
    assert_eq!(sink.buffered(), 0);
    assert_eq!(sink.inner().frames().len(), 5);
    assert_eq!(artifact.len(), 5 * 16);
    assert_eq!(artifact.bytes[4 * 16], 4);
}

#[test]
fn batch_sink_abort_reaches_inner() {
    let mut sink = BatchSink::new(InMemorySink::new());
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2, 0)).unwrap();
    sink.abort();
    assert_eq!(sink.buffered(), 0);
    assert!(sink.into_inner().was_aborted());
}

#[test]
fn boxed_sink_forwards() {
    let mut sink: Box<dyn FrameSink> = Box::new(InMemorySink::new());
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1, 1, 7)).unwrap();
    assert_eq!(sink.end().unwrap().bytes, vec![7; 4]);
}
