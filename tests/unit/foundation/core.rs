use super::*;

#[test]
fn fps_rounds_seconds_to_nearest_frame() {
    let fps = Fps::whole(30);
    assert_eq!(fps.secs_to_frames_round(1.0), 30);
    assert_eq!(fps.secs_to_frames_round(0.3), 9);
    assert_eq!(fps.secs_to_frames_round(0.4), 12);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
    assert!((fps.frames_to_secs(45) - 1.5).abs() < 1e-12);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap(), Fps::default());
}

#[test]
fn canvas_validates_and_reports_geometry() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());

    let c = Canvas::new(1080, 1920).unwrap();
    assert!((c.aspect() - 0.5625).abs() < 1e-12);
    assert_eq!(c.center(), Point::new(540.0, 960.0));
    assert_eq!(c.rgba8_len(), 1080 * 1920 * 4);
}

#[test]
fn unit_to_u8_clamps_and_rounds() {
    assert_eq!(unit_to_u8(0.5), 128);
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(2.0), 255);
    assert_eq!(unit_to_u8(0.2), 51);
}
