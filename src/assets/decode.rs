use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Decode any format supported by `image` into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    prepare_straight_rgba8(width, height, rgba.into_raw())
}

/// Wrap already-decoded straight-alpha RGBA8 pixels.
pub fn prepare_straight_rgba8(
    width: u32,
    height: u32,
    mut rgba8: Vec<u8>,
) -> ReelResult<PreparedImage> {
    if width == 0 || height == 0 {
        return Err(ReelError::validation("image width/height must be non-zero"));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ReelError::validation("image buffer size overflow"))?;
    if rgba8.len() != expected {
        return Err(ReelError::validation(format!(
            "image buffer has {} bytes, expected {expected} for {width}x{height}",
            rgba8.len()
        )));
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(ReelError::validation(format!(
            "image {width}x{height} exceeds the {max}x{max} raster limit",
            max = u16::MAX
        )));
    }

    premultiply_rgba8_in_place(&mut rgba8);
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
