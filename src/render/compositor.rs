use std::collections::HashMap;

use crate::animation::ease::Ease;
use crate::assets::font::{FontFace, TextBrushRgba8, TextLayoutEngine};
use crate::assets::image::{ImageId, ReelImage};
use crate::effects::transitions::{CompositeInstruction, Layer, TransitionKind};
use crate::foundation::core::{Affine, Canvas, Rect, Vec2, unit_to_u8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::FrameRGBA;
use crate::render::overlay::{gradient_paint, image_paint_from_premul};
use crate::render::placement::CoverFit;
use crate::scene::quote::Quote;
use crate::scene::settings::{OverlayStyle, ReelSettings};
use crate::text::wrap::{TextBlock, wrap};

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// One shaped line and the top-left corner of its layout box in frame space.
struct PlacedLine {
    layout: parley::Layout<TextBrushRgba8>,
    x: f64,
    y: f64,
}

/// Shaped overlay text. The quote never changes during a reel, so this is built once.
struct TextOverlay {
    font: vello_cpu::peniko::FontData,
    quote: Vec<PlacedLine>,
    author: Option<PlacedLine>,
    watermark: Option<PlacedLine>,
}

/// Renders reel frames with `vello_cpu`.
///
/// Each call to [`FrameCompositor::render_frame`] starts from a reset context; nothing drawn for
/// one frame leaks into the next. Decoded image paints are cached by image id, holding only the
/// current and next image.
pub struct FrameCompositor {
    canvas: Canvas,
    transition: TransitionKind,
    ease: Ease,
    quote: Quote,
    style: OverlayStyle,
    engine: Option<TextLayoutEngine>,
    text: Option<TextOverlay>,
    ctx: Option<vello_cpu::RenderContext>,
    target: Option<vello_cpu::Pixmap>,
    paints: HashMap<ImageId, ImagePaint>,
    gradient: Option<vello_cpu::Image>,
}

impl FrameCompositor {
    /// Create a compositor for `canvas`. Without a font, text steps are skipped.
    pub fn new(
        canvas: Canvas,
        settings: &ReelSettings,
        quote: Quote,
        style: OverlayStyle,
        font: Option<&FontFace>,
    ) -> ReelResult<Self> {
        style.layout.validate()?;
        let engine = font.map(TextLayoutEngine::new).transpose()?;
        if engine.is_none() {
            tracing::warn!("no font configured; quote, author and watermark text will be skipped");
        }
        Ok(Self {
            canvas,
            transition: settings.transition,
            ease: settings.ease,
            quote,
            style,
            engine,
            text: None,
            ctx: None,
            target: None,
            paints: HashMap::new(),
            gradient: None,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Render one frame.
    ///
    /// A transition is drawn only when `transition_progress < 1`, `next` is supplied and the
    /// transition kind blends; otherwise `image` is drawn alone.
    pub fn render_frame(
        &mut self,
        image: &ReelImage,
        transition_progress: f64,
        next: Option<&ReelImage>,
    ) -> ReelResult<FrameRGBA> {
        let current = self.paint_for(image)?;
        let incoming = match next {
            Some(n) if transition_progress < 1.0 && self.transition.blends() => {
                Some(self.paint_for(n)?)
            }
            _ => None,
        };
        self.paints
            .retain(|id, _| *id == image.id() || next.is_some_and(|n| n.id() == *id));

        let fit_out = CoverFit::compute(current.w, current.h, self.canvas)?;
        let instruction = match &incoming {
            Some(inc) => {
                let fit_in = CoverFit::compute(inc.w, inc.h, self.canvas)?;
                let p = self.ease.apply(transition_progress);
                self.transition.blend(fit_out, fit_in, p, self.canvas)
            }
            None => CompositeInstruction::single(fit_out),
        };

        if self.gradient.is_none() {
            self.gradient = Some(gradient_paint(self.canvas, &self.style.layout)?);
        }
        if self.text.is_none() && self.engine.is_some() {
            self.text = Some(self.build_text_overlay()?);
        }

        let (w, h) = self.canvas_u16()?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        clear_black(&mut ctx, self.canvas);
        for draw in &instruction.draws {
            let paint = match draw.layer {
                Layer::Outgoing => &current,
                Layer::Incoming => match &incoming {
                    Some(p) => p,
                    None => continue,
                },
            };
            draw_image(&mut ctx, paint, draw.transform, draw.opacity);
        }
        if let Some(gradient) = &self.gradient {
            fill_canvas(&mut ctx, self.canvas, gradient.clone());
        }
        if let Some(text) = &self.text {
            draw_text_overlay(&mut ctx, text, &self.style, self.canvas);
        }

        ctx.flush();
        let mut target = match self.target.take() {
            Some(pm) if pm.width() == w && pm.height() == h => pm,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        ctx.render_to_pixmap(&mut target);
        let frame = FrameRGBA::from_premul(self.canvas, target.data_as_u8_slice().to_vec());

        self.ctx = Some(ctx);
        self.target = Some(target);
        frame
    }

    /// Decode `image` into the paint cache so the next [`FrameCompositor::render_frame`] that
    /// draws it does not have to.
    pub fn prepare(&mut self, image: &ReelImage) -> ReelResult<()> {
        self.paint_for(image).map(|_| ())
    }

    /// Number of decoded images currently held.
    pub fn cached_images(&self) -> usize {
        self.paints.len()
    }

    fn canvas_u16(&self) -> ReelResult<(u16, u16)> {
        let w = u16::try_from(self.canvas.width)
            .map_err(|_| ReelError::render("canvas width exceeds u16"))?;
        let h = u16::try_from(self.canvas.height)
            .map_err(|_| ReelError::render("canvas height exceeds u16"))?;
        Ok((w, h))
    }

    fn paint_for(&mut self, image: &ReelImage) -> ReelResult<ImagePaint> {
        if let Some(p) = self.paints.get(&image.id()) {
            return Ok(p.clone());
        }
        let prepared = image.decoded()?;
        let paint =
            image_paint_from_premul(&prepared.rgba8_premul, prepared.width, prepared.height)?;
        let out = ImagePaint {
            paint,
            w: prepared.width,
            h: prepared.height,
        };
        self.paints.insert(image.id(), out.clone());
        Ok(out)
    }

    fn build_text_overlay(&mut self) -> ReelResult<TextOverlay> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(ReelError::render("text overlay requested without a font"));
        };
        let layout = self.style.layout;
        let fw = f64::from(self.canvas.width);
        let fh = f64::from(self.canvas.height);

        let quote_size = (layout.quote_font_frac * fw) as f32;
        let line_height = f64::from(quote_size) * layout.line_height_mul;
        let max_width = (layout.quote_max_width_frac * fw) as f32;
        let lines = {
            let mut m = engine.measurer(quote_size);
            wrap(&self.quote.text, max_width, |s| m.measure(s))
        };
        let block = TextBlock::centered(lines, layout.quote_anchor_frac * fh, line_height);
        let mut quote = Vec::with_capacity(block.lines.len());
        for (top, line) in block.positioned() {
            quote.push(place_line(engine, line, quote_size, top, line_height, fw)?);
        }

        let single = |engine: &mut TextLayoutEngine, text: &str, size_frac: f64, anchor: f64| {
            let size = (size_frac * fw) as f32;
            let lh = f64::from(size) * layout.line_height_mul;
            let top = anchor * fh - lh / 2.0;
            place_line(engine, text, size, top, lh, fw)
        };
        let author = self
            .quote
            .author_line()
            .map(|l| single(engine, &l, layout.author_font_frac, layout.author_anchor_frac))
            .transpose()?;
        let watermark = if self.style.watermark.trim().is_empty() {
            None
        } else {
            Some(single(
                engine,
                self.style.watermark.trim(),
                layout.watermark_font_frac,
                layout.watermark_anchor_frac,
            )?)
        };

        tracing::debug!(
            quote_lines = quote.len(),
            author = author.is_some(),
            watermark = watermark.is_some(),
            "shaped text overlay"
        );
        Ok(TextOverlay {
            font: engine.face().font_data().clone(),
            quote,
            author,
            watermark,
        })
    }
}

/// Shape `text` and center it horizontally inside the line box starting at `top`.
fn place_line(
    engine: &mut TextLayoutEngine,
    text: &str,
    size_px: f32,
    top: f64,
    line_height: f64,
    frame_width: f64,
) -> ReelResult<PlacedLine> {
    let layout = engine.layout_line(text, size_px, TextBrushRgba8::WHITE)?;
    let x = (frame_width - f64::from(layout.width())) / 2.0;
    let y = top + (line_height - f64::from(layout.height())) / 2.0;
    Ok(PlacedLine { layout, x, y })
}

fn clear_black(ctx: &mut vello_cpu::RenderContext, canvas: Canvas) {
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
    ctx.fill_rect(&canvas.rect());
}

fn fill_canvas(ctx: &mut vello_cpu::RenderContext, canvas: Canvas, paint: vello_cpu::Image) {
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(paint);
    ctx.fill_rect(&canvas.rect());
}

fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    p: &ImagePaint,
    transform: Affine,
    opacity: f32,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    ctx.set_transform(transform);
    ctx.set_paint(p.paint.clone());
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(p.w), f64::from(p.h)));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn draw_text_overlay(
    ctx: &mut vello_cpu::RenderContext,
    text: &TextOverlay,
    style: &OverlayStyle,
    canvas: Canvas,
) {
    let layout = &style.layout;
    let offset = layout.shadow_offset_frac * f64::from(canvas.width);
    let shadow = TextBrushRgba8::BLACK.with_alpha(unit_to_u8(layout.shadow_alpha));
    for line in &text.quote {
        for pass in 1..=layout.shadow_passes {
            let d = offset * f64::from(pass);
            draw_line(ctx, &text.font, line, Vec2::new(d, d), shadow);
        }
        draw_line(ctx, &text.font, line, Vec2::ZERO, TextBrushRgba8::WHITE);
    }
    if let Some(line) = &text.author {
        let color = TextBrushRgba8::WHITE.with_alpha(unit_to_u8(layout.author_alpha));
        draw_line(ctx, &text.font, line, Vec2::ZERO, color);
    }
    if let Some(line) = &text.watermark {
        let color = TextBrushRgba8::WHITE.with_alpha(unit_to_u8(layout.watermark_alpha));
        draw_line(ctx, &text.font, line, Vec2::ZERO, color);
    }
}

fn draw_line(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    line: &PlacedLine,
    offset: Vec2,
    color: TextBrushRgba8,
) {
    ctx.set_transform(Affine::translate(Vec2::new(line.x, line.y) + offset));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    for l in line.layout.lines() {
        for item in l.items() {
            let parley::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
