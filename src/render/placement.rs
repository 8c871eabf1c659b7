use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{ReelError, ReelResult};

/// Where an image lands when scaled to cover the whole frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Destination rectangle in frame space. At least one axis overflows the frame equally on
    /// both sides; the other matches it exactly.
    pub dest: Rect,
    /// Uniform scale from image pixels to frame pixels.
    pub scale: f64,
}

impl CoverFit {
    /// Cover-fit an `image_width × image_height` image into `canvas`.
    ///
    /// Wider-than-frame images take the frame height and overflow horizontally; otherwise the
    /// image takes the frame width and overflows vertically. Both axes are centered.
    pub fn compute(image_width: u32, image_height: u32, canvas: Canvas) -> ReelResult<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(ReelError::validation("cannot place a zero-sized image"));
        }
        let fw = f64::from(canvas.width);
        let fh = f64::from(canvas.height);
        let image_aspect = f64::from(image_width) / f64::from(image_height);

        let (w, h) = if image_aspect > canvas.aspect() {
            (fh * image_aspect, fh)
        } else {
            (fw, fw / image_aspect)
        };
        let x = (fw - w) / 2.0;
        let y = (fh - h) / 2.0;
        Ok(Self {
            dest: Rect::new(x, y, x + w, y + h),
            scale: w / f64::from(image_width),
        })
    }

    /// Map image pixel coordinates into frame space.
    pub fn transform(self) -> Affine {
        Affine::translate(Vec2::new(self.dest.x0, self.dest.y0)) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/placement.rs"]
mod tests;
