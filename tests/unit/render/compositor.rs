use super::*;
use crate::assets::font::find_system_font;

fn solid(r: u8, g: u8, b: u8, w: u32, h: u32) -> ReelImage {
    let data = [r, g, b, 255].repeat((w * h) as usize);
    ReelImage::from_rgba8("solid", w, h, data).unwrap()
}

fn compositor(kind: TransitionKind, font: Option<&FontFace>) -> FrameCompositor {
    let settings = ReelSettings {
        transition: kind,
        ..ReelSettings::default()
    };
    FrameCompositor::new(
        Canvas::new(20, 40).unwrap(),
        &settings,
        Quote::new("Simplicity is the ultimate sophistication.", "Leonardo"),
        OverlayStyle::default(),
        font,
    )
    .unwrap()
}

fn close(a: u8, b: u8, tol: u8) -> bool {
    a.abs_diff(b) <= tol
}

// Row 20 of 40 sits in the light middle band of the gradient (alpha 0.2).
const MID_ROW: u32 = 20;

#[test]
fn plain_frame_is_opaque_and_darkened_by_gradient() {
    let mut c = compositor(TransitionKind::Cut, None);
    let red = solid(255, 0, 0, 10, 10);
    let f = c.render_frame(&red, 0.0, None).unwrap();
    assert_eq!((f.width, f.height), (20, 40));
    assert!(f.premultiplied);
    assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));

    let mid = f.pixel(10, MID_ROW).unwrap();
    assert!(close(mid[0], 204, 4), "{mid:?}");
    assert!(mid[1] <= 2 && mid[2] <= 2);

    // Edges get the heavier 0.6 gradient.
    let top = f.pixel(10, 0).unwrap();
    assert!(top[0] < mid[0]);
}

#[test]
fn cut_ignores_next_image() {
    let mut c = compositor(TransitionKind::Cut, None);
    let red = solid(255, 0, 0, 4, 4);
    let blue = solid(0, 0, 255, 4, 4);
    let with_next = c.render_frame(&red, 0.5, Some(&blue)).unwrap();
    let alone = c.render_frame(&red, 0.0, None).unwrap();
    assert_eq!(with_next, alone);
}

#[test]
fn fade_mixes_both_images() {
    let mut c = compositor(TransitionKind::Fade, None);
    let red = solid(255, 0, 0, 4, 4);
    let blue = solid(0, 0, 255, 4, 4);
    let f = c.render_frame(&red, 0.5, Some(&blue)).unwrap();
    // Outgoing at 0.5 over black, then incoming at 0.5 on top: red 255·0.25, blue 255·0.5,
    // both darkened 20% by the gradient.
    let px = f.pixel(10, MID_ROW).unwrap();
    assert!(close(px[0], 51, 6), "{px:?}");
    assert!(close(px[2], 102, 6), "{px:?}");
}

#[test]
fn progress_of_one_draws_current_only() {
    let mut c = compositor(TransitionKind::Fade, None);
    let red = solid(255, 0, 0, 4, 4);
    let blue = solid(0, 0, 255, 4, 4);
    let f = c.render_frame(&red, 1.0, Some(&blue)).unwrap();
    let px = f.pixel(10, MID_ROW).unwrap();
    assert!(close(px[0], 204, 4) && px[2] <= 2, "{px:?}");
}

#[test]
fn slide_places_images_side_by_side() {
    let mut c = compositor(TransitionKind::Slide, None);
    let red = solid(255, 0, 0, 4, 8);
    let blue = solid(0, 0, 255, 4, 8);
    let f = c.render_frame(&red, 0.5, Some(&blue)).unwrap();
    let left = f.pixel(4, MID_ROW).unwrap();
    let right = f.pixel(15, MID_ROW).unwrap();
    assert!(left[0] > 150 && left[2] < 10, "{left:?}");
    assert!(right[2] > 150 && right[0] < 10, "{right:?}");
}

#[test]
fn zoom_fades_outgoing_to_black_without_incoming() {
    let mut c = compositor(TransitionKind::Zoom, None);
    let red = solid(255, 0, 0, 4, 4);
    let blue = solid(0, 0, 255, 4, 4);
    let f = c.render_frame(&red, 0.5, Some(&blue)).unwrap();
    let px = f.pixel(10, MID_ROW).unwrap();
    assert!(close(px[0], 102, 6), "{px:?}");
    assert!(px[2] <= 2, "{px:?}");
}

#[test]
fn eased_blend_changes_the_mix() {
    let red = solid(255, 0, 0, 4, 4);
    let blue = solid(0, 0, 255, 4, 4);
    let settings = ReelSettings {
        transition: TransitionKind::Fade,
        ease: Ease::InQuad,
        ..ReelSettings::default()
    };
    let mut c = FrameCompositor::new(
        Canvas::new(20, 40).unwrap(),
        &settings,
        Quote::default(),
        OverlayStyle::default(),
        None,
    )
    .unwrap();
    // InQuad(0.5) = 0.25, so red dominates.
    let px = c.render_frame(&red, 0.5, Some(&blue)).unwrap().pixel(10, MID_ROW).unwrap();
    assert!(px[0] > px[2] + 50, "{px:?}");
}

#[test]
fn undecodable_image_is_an_error() {
    let mut c = compositor(TransitionKind::Fade, None);
    let bad = ReelImage::from_bytes("bad", b"nope".to_vec());
    assert!(c.render_frame(&bad, 0.0, None).is_err());
}

#[test]
fn paint_cache_holds_only_current_and_next() {
    let mut c = compositor(TransitionKind::Fade, None);
    let imgs = [
        solid(255, 0, 0, 4, 4),
        solid(0, 255, 0, 4, 4),
        solid(0, 0, 255, 4, 4),
    ];
    for i in 0..imgs.len() {
        let next = &imgs[(i + 1) % imgs.len()];
        c.prepare(next).unwrap();
        c.render_frame(&imgs[i], 0.5, Some(next)).unwrap();
        assert_eq!(c.cached_images(), 2);
        c.render_frame(&imgs[i], 0.0, None).unwrap();
        assert_eq!(c.cached_images(), 1);
    }
}

#[test]
fn prepare_reports_undecodable_images() {
    let mut c = compositor(TransitionKind::Cut, None);
    assert!(c.prepare(&ReelImage::from_bytes("bad", b"nope".to_vec())).is_err());
    assert_eq!(c.cached_images(), 0);
}

#[test]
fn text_overlay_brightens_quote_band() {
    let Some(path) = find_system_font() else {
        eprintln!("no system font found; skipping");
        return;
    };
    let face = FontFace::from_path(path).unwrap();
    let settings = ReelSettings::default();
    let canvas = Canvas::new(270, 480).unwrap();
    let quote = Quote::new("Simplicity is the ultimate sophistication.", "Leonardo");
    let black = solid(0, 0, 0, 9, 16);

    let mut with_text =
        FrameCompositor::new(canvas, &settings, quote.clone(), OverlayStyle::default(), Some(&face))
            .unwrap();
    let mut without_text =
        FrameCompositor::new(canvas, &settings, quote, OverlayStyle::default(), None).unwrap();

    let a = with_text.render_frame(&black, 0.0, None).unwrap();
    let b = without_text.render_frame(&black, 0.0, None).unwrap();
    assert_ne!(a, b);

    let band = |f: &FrameRGBA, y0: u32, y1: u32| -> u32 {
        (y0..y1)
            .flat_map(|y| (0..f.width).map(move |x| (x, y)))
            .map(|(x, y)| u32::from(f.pixel(x, y).unwrap()[0]))
            .max()
            .unwrap()
    };
    // Quote centered at 45% of height.
    assert!(band(&a, 170, 260) > 100);
    assert_eq!(band(&b, 170, 260), 0);
}
