use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Same color with alpha replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// A font file (TTF/OTF) used for every text step of a reel.
#[derive(Clone)]
pub struct FontFace {
    label: String,
    bytes: Arc<Vec<u8>>,
    data: vello_cpu::peniko::FontData,
}

impl FontFace {
    /// Wrap raw font bytes. Parsing happens when a [`TextLayoutEngine`] is built from the face.
    pub fn from_bytes(label: impl Into<String>, bytes: Vec<u8>) -> ReelResult<Self> {
        if bytes.is_empty() {
            return Err(ReelError::validation("font bytes must be non-empty"));
        }
        let bytes = Arc::new(bytes);
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Ok(Self {
            label: label.into(),
            bytes,
            data,
        })
    }

    /// Read a font file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("label", &self.label)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Stateful helper for shaping single lines of text with one registered font.
///
/// Line breaking is done by [`crate::text::wrap`], not by Parley, so preview and final renders
/// break identically regardless of resolution.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    face: FontFace,
}

impl TextLayoutEngine {
    /// Register `face` with a fresh Parley font context.
    pub fn new(face: &FontFace) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::new();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::validation(format!("no font families found in '{}'", face.label))
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(font = %face.label, family = %family, "registered font");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            face: face.clone(),
        })
    }

    /// The face this engine shapes with.
    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Family name the face registered under.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Shape one unbroken line.
    pub fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::StyleProperty::FontFamily(parley::FontFamily::Single(
            parley::FontFamilyName::Named(std::borrow::Cow::Owned(self.family.clone())),
        )));
        builder.push_default(parley::StyleProperty::FontSize(size_px));
        builder.push_default(parley::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` at `size_px`, or `0.0` for an invalid size.
    pub fn measure(&mut self, text: &str, size_px: f32) -> f32 {
        self.layout_line(text, size_px, TextBrushRgba8::default())
            .map(|layout| layout.width())
            .unwrap_or(0.0)
    }

    /// A measuring closure bound to one font size, for [`crate::text::wrap`].
    pub fn measurer(&mut self, size_px: f32) -> FontMeasure<'_> {
        FontMeasure {
            engine: self,
            size_px,
        }
    }
}

/// Width measurement through a real font at a fixed size.
pub struct FontMeasure<'a> {
    engine: &'a mut TextLayoutEngine,
    size_px: f32,
}

impl FontMeasure<'_> {
    pub fn measure(&mut self, text: &str) -> f32 {
        self.engine.measure(text, self.size_px)
    }
}

/// Look for a usable system font in the usual Linux/macOS locations.
///
/// Only used when no font is configured explicitly.
pub fn find_system_font() -> Option<std::path::PathBuf> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
    ];
    CANDIDATES
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| p.is_file())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
