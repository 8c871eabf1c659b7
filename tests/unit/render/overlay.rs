use super::*;

fn layout() -> OverlayLayout {
    OverlayLayout::default()
}

#[test]
fn gradient_is_heavy_at_edges_and_light_in_middle() {
    let l = layout();
    assert!((gradient_alpha_at(0.0, &l) - 0.6).abs() < 1e-6);
    assert!((gradient_alpha_at(1.0, &l) - 0.6).abs() < 1e-6);
    for t in [0.3, 0.45, 0.5, 0.7] {
        assert!((gradient_alpha_at(t, &l) - 0.2).abs() < 1e-6, "t={t}");
    }
    assert!((gradient_alpha_at(0.15, &l) - 0.4).abs() < 1e-6);
    assert!((gradient_alpha_at(0.85, &l) - 0.4).abs() < 1e-6);
}

#[test]
fn gradient_raster_rows_follow_alpha_curve() {
    let canvas = Canvas::new(4, 11).unwrap();
    let bytes = gradient_rgba8_premul(canvas, &layout());
    assert_eq!(bytes.len(), canvas.rgba8_len());

    let row_alpha = |y: usize| bytes[y * 16 + 3];
    assert_eq!(row_alpha(0), 153);
    assert_eq!(row_alpha(10), 153);
    assert_eq!(row_alpha(5), 51);
    // Every pixel is premultiplied black.
    assert!(bytes.chunks_exact(4).all(|px| px[..3] == [0, 0, 0]));
    // Rows are uniform.
    assert!(bytes[..16].chunks_exact(4).all(|px| px[3] == 153));
}

#[test]
fn pixmap_rejects_mismatched_lengths() {
    assert!(pixmap_from_premul_bytes(&[0; 7], 1, 2).is_err());
    assert!(pixmap_from_premul_bytes(&[0; 8], 1, 2).is_ok());
    assert!(pixmap_from_premul_bytes(&[], 70_000, 0).is_err());
}

#[test]
fn gradient_paint_builds_for_canvas() {
    let canvas = Canvas::new(8, 16).unwrap();
    gradient_paint(canvas, &layout()).unwrap();
}
