use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha. Compositor output is always fully opaque because every frame
/// starts from an opaque black clear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Wrap premultiplied bytes, checking the buffer length.
    pub fn from_premul(canvas: Canvas, data: Vec<u8>) -> ReelResult<Self> {
        if data.len() != canvas.rgba8_len() {
            return Err(ReelError::render(format!(
                "frame buffer has {} bytes, expected {} for {}x{}",
                data.len(),
                canvas.rgba8_len(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }

    /// Pixel at `(x, y)` as `[r, g, b, a]`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Save as PNG. Premultiplied data is un-premultiplied first.
    pub fn save_png(&self, path: &std::path::Path) -> ReelResult<()> {
        use anyhow::Context as _;

        let mut rgba = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut rgba);
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, rgba)
            .ok_or_else(|| ReelError::render("frame buffer does not match its dimensions"))?;
        img.save(path)
            .with_context(|| format!("failed to write png '{}'", path.display()))?;
        Ok(())
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
