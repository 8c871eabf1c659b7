use std::sync::Arc;

use crate::foundation::core::{Canvas, unit_to_u8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::settings::OverlayLayout;

/// Vertical positions (fractions of height) of the gradient stops.
pub const GRADIENT_STOPS: [f64; 4] = [0.0, 0.3, 0.7, 1.0];

/// Alpha of the black legibility gradient at `t` (0 = top, 1 = bottom).
///
/// Edge alpha at both ends, mid alpha across `[0.3, 0.7]`, linear in between.
pub fn gradient_alpha_at(t: f64, layout: &OverlayLayout) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let edge = layout.gradient_edge_alpha;
    let mid = layout.gradient_mid_alpha;
    let [s0, s1, s2, s3] = GRADIENT_STOPS;
    if t <= s1 {
        lerp_f32(edge, mid, (t - s0) / (s1 - s0))
    } else if t <= s2 {
        mid
    } else {
        lerp_f32(mid, edge, (t - s2) / (s3 - s2))
    }
}

fn lerp_f32(a: f32, b: f32, t: f64) -> f32 {
    crate::foundation::math::lerp(f64::from(a), f64::from(b), t) as f32
}

/// Premultiplied RGBA8 rows of the gradient overlay for `canvas`.
pub fn gradient_rgba8_premul(canvas: Canvas, layout: &OverlayLayout) -> Vec<u8> {
    let w = canvas.width as usize;
    let h = canvas.height;
    let h1 = f64::from(h.max(2) - 1);
    let mut bytes = vec![0u8; canvas.rgba8_len()];
    for (y, row) in bytes.chunks_exact_mut(w * 4).enumerate() {
        let a = unit_to_u8(gradient_alpha_at(y as f64 / h1, layout));
        for px in row.chunks_exact_mut(4) {
            // Black, so premultiplied color stays zero.
            px[3] = a;
        }
    }
    bytes
}

/// Build a `vello_cpu` image paint for the gradient overlay.
pub(crate) fn gradient_paint(canvas: Canvas, layout: &OverlayLayout) -> ReelResult<vello_cpu::Image> {
    let bytes = gradient_rgba8_premul(canvas, layout);
    image_paint_from_premul(&bytes, canvas.width, canvas.height)
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ReelError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

pub(crate) fn image_paint_from_premul(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
