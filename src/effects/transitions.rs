use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::render::placement::CoverFit;

/// How consecutive images hand over inside a transition window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// No special effect. Behaves like [`TransitionKind::Cut`].
    Default,
    /// Cross-fade.
    #[default]
    Fade,
    /// Outgoing image pushed out to the left by the incoming one.
    Slide,
    /// Outgoing image grows slightly while fading to black.
    Zoom,
    /// Hard switch at the slot boundary.
    Cut,
}

/// Which of the two images a draw refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Outgoing,
    Incoming,
}

/// One image draw: image-pixel space to frame space, at an opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageDraw {
    pub layer: Layer,
    pub transform: Affine,
    pub opacity: f32,
}

/// Ordered draws (back to front) the compositor executes for one frame's background.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeInstruction {
    pub draws: Vec<ImageDraw>,
}

impl CompositeInstruction {
    /// The outgoing image alone, fully opaque.
    pub fn single(outgoing: CoverFit) -> Self {
        Self {
            draws: vec![ImageDraw {
                layer: Layer::Outgoing,
                transform: outgoing.transform(),
                opacity: 1.0,
            }],
        }
    }

    pub fn draws_layer(&self, layer: Layer) -> bool {
        self.draws.iter().any(|d| d.layer == layer)
    }
}

/// Blend strategy for one transition kind.
pub trait Transition: Send + Sync {
    fn name(&self) -> &'static str;

    /// Draws for `progress` in `[0, 1]`; 0 is the start of the window, 1 fully switched.
    fn blend(
        &self,
        outgoing: CoverFit,
        incoming: CoverFit,
        progress: f64,
        canvas: Canvas,
    ) -> CompositeInstruction;
}

struct FadeTransition;
struct SlideTransition;
struct ZoomTransition;
struct NoBlend(&'static str);

/// Extra scale the outgoing image reaches at the end of a zoom.
const ZOOM_GROWTH: f64 = 0.1;

impl Transition for FadeTransition {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn blend(
        &self,
        outgoing: CoverFit,
        incoming: CoverFit,
        progress: f64,
        _canvas: Canvas,
    ) -> CompositeInstruction {
        let p = progress.clamp(0.0, 1.0) as f32;
        CompositeInstruction {
            draws: vec![
                ImageDraw {
                    layer: Layer::Outgoing,
                    transform: outgoing.transform(),
                    opacity: 1.0 - p,
                },
                ImageDraw {
                    layer: Layer::Incoming,
                    transform: incoming.transform(),
                    opacity: p,
                },
            ],
        }
    }
}

impl Transition for SlideTransition {
    fn name(&self) -> &'static str {
        "slide"
    }

    fn blend(
        &self,
        outgoing: CoverFit,
        incoming: CoverFit,
        progress: f64,
        canvas: Canvas,
    ) -> CompositeInstruction {
        let p = progress.clamp(0.0, 1.0);
        let w = f64::from(canvas.width);
        CompositeInstruction {
            draws: vec![
                ImageDraw {
                    layer: Layer::Outgoing,
                    transform: Affine::translate(Vec2::new(-p * w, 0.0)) * outgoing.transform(),
                    opacity: 1.0,
                },
                ImageDraw {
                    layer: Layer::Incoming,
                    transform: Affine::translate(Vec2::new((1.0 - p) * w, 0.0))
                        * incoming.transform(),
                    opacity: 1.0,
                },
            ],
        }
    }
}

impl Transition for ZoomTransition {
    fn name(&self) -> &'static str {
        "zoom"
    }

    // The incoming image is not drawn; it appears on the base draw of its own slot.
    fn blend(
        &self,
        outgoing: CoverFit,
        _incoming: CoverFit,
        progress: f64,
        canvas: Canvas,
    ) -> CompositeInstruction {
        let p = progress.clamp(0.0, 1.0);
        let c = canvas.center().to_vec2();
        let zoom = Affine::translate(c) * Affine::scale(1.0 + ZOOM_GROWTH * p) * Affine::translate(-c);
        CompositeInstruction {
            draws: vec![ImageDraw {
                layer: Layer::Outgoing,
                transform: zoom * outgoing.transform(),
                opacity: (1.0 - p) as f32,
            }],
        }
    }
}

impl Transition for NoBlend {
    fn name(&self) -> &'static str {
        self.0
    }

    fn blend(
        &self,
        outgoing: CoverFit,
        _incoming: CoverFit,
        _progress: f64,
        _canvas: Canvas,
    ) -> CompositeInstruction {
        CompositeInstruction::single(outgoing)
    }
}

static FADE: FadeTransition = FadeTransition;
static SLIDE: SlideTransition = SlideTransition;
static ZOOM: ZoomTransition = ZoomTransition;
static DEFAULT: NoBlend = NoBlend("default");
static CUT: NoBlend = NoBlend("cut");

impl TransitionKind {
    pub const ALL: [Self; 5] = [Self::Default, Self::Fade, Self::Slide, Self::Zoom, Self::Cut];

    /// The strategy implementing this kind.
    pub fn blender(self) -> &'static dyn Transition {
        match self {
            Self::Default => &DEFAULT,
            Self::Fade => &FADE,
            Self::Slide => &SLIDE,
            Self::Zoom => &ZOOM,
            Self::Cut => &CUT,
        }
    }

    /// Return `true` for kinds that draw anything other than the current image.
    pub fn blends(self) -> bool {
        !matches!(self, Self::Default | Self::Cut)
    }

    pub fn name(self) -> &'static str {
        self.blender().name()
    }

    /// Background draws for one frame inside a transition window.
    pub fn blend(
        self,
        outgoing: CoverFit,
        incoming: CoverFit,
        progress: f64,
        canvas: Canvas,
    ) -> CompositeInstruction {
        self.blender().blend(outgoing, incoming, progress, canvas)
    }
}

impl std::str::FromStr for TransitionKind {
    type Err = crate::foundation::error::ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::foundation::error::ReelError::validation(format!(
                    "unknown transition '{s}' (expected default, fade, slide, zoom or cut)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
