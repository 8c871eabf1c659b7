use crate::animation::ease::Ease;
use crate::effects::transitions::TransitionKind;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// Per-image durations offered as presets. Any finite positive value is accepted.
pub const PRESET_SECONDS_PER_IMAGE: [f64; 9] = [0.3, 0.4, 0.5, 0.8, 1.0, 2.0, 3.0, 4.0, 5.0];

/// Output profile: canvas size plus target bitrate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// 1080×1920 portrait at 8 Mbps.
    #[default]
    Hd,
    /// 2160×3840 portrait at 35 Mbps.
    #[serde(rename = "4k", alias = "uhd4k")]
    Uhd4k,
    /// Any size/bitrate pair.
    Custom {
        width: u32,
        height: u32,
        bitrate_kbps: u32,
    },
}

impl Quality {
    /// Validated output canvas for this profile.
    pub fn canvas(self) -> ReelResult<Canvas> {
        match self {
            Self::Hd => Canvas::new(1080, 1920),
            Self::Uhd4k => Canvas::new(2160, 3840),
            Self::Custom { width, height, .. } => Canvas::new(width, height),
        }
    }

    pub fn bitrate_kbps(self) -> u32 {
        match self {
            Self::Hd => 8_000,
            Self::Uhd4k => 35_000,
            Self::Custom { bitrate_kbps, .. } => bitrate_kbps,
        }
    }

    /// Short tag used in artifact file names.
    pub fn label(self) -> String {
        match self {
            Self::Hd => "hd".to_string(),
            Self::Uhd4k => "4k".to_string(),
            Self::Custom { width, height, .. } => format!("{width}x{height}"),
        }
    }

    /// Next lower profile tried when the encoder refuses this one.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Self::Uhd4k => Some(Self::Hd),
            Self::Hd | Self::Custom { .. } => None,
        }
    }

    pub fn validate(self) -> ReelResult<()> {
        self.canvas()?;
        if self.bitrate_kbps() == 0 {
            return Err(ReelError::validation("quality bitrate_kbps must be > 0"));
        }
        Ok(())
    }
}

/// User-facing reel settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReelSettings {
    /// Display time of each image, transition included.
    pub seconds_per_image: f64,
    pub transition: TransitionKind,
    pub quality: Quality,
    /// Curve applied to the drawn blend inside each transition window.
    pub ease: Ease,
}

impl Default for ReelSettings {
    fn default() -> Self {
        Self {
            seconds_per_image: 3.0,
            transition: TransitionKind::Fade,
            quality: Quality::Hd,
            ease: Ease::Linear,
        }
    }
}

impl ReelSettings {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.seconds_per_image.is_finite() || self.seconds_per_image <= 0.0 {
            return Err(ReelError::validation(format!(
                "seconds_per_image must be finite and > 0, got {}",
                self.seconds_per_image
            )));
        }
        self.quality.validate()
    }

    /// Length of the trailing transition window of each image slot, in seconds.
    ///
    /// 30% of the slot, clamped to `[0.1, 0.5]`.
    pub fn transition_secs(&self) -> f64 {
        (0.3 * self.seconds_per_image).clamp(0.1, 0.5)
    }

    /// Return `true` when `seconds_per_image` is one of the presets.
    pub fn is_preset_duration(&self) -> bool {
        PRESET_SECONDS_PER_IMAGE
            .iter()
            .any(|p| (p - self.seconds_per_image).abs() < 1e-9)
    }
}

/// Proportional placement of every overlay element, as fractions of frame width/height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayLayout {
    /// Quote font size / frame width.
    pub quote_font_frac: f64,
    /// Line advance / quote font size.
    pub line_height_mul: f64,
    /// Wrap width / frame width.
    pub quote_max_width_frac: f64,
    /// Quote block center / frame height.
    pub quote_anchor_frac: f64,
    /// Drop shadow offset / frame width.
    pub shadow_offset_frac: f64,
    pub shadow_passes: u32,
    pub shadow_alpha: f32,
    pub author_font_frac: f64,
    pub author_anchor_frac: f64,
    pub author_alpha: f32,
    pub watermark_font_frac: f64,
    pub watermark_anchor_frac: f64,
    pub watermark_alpha: f32,
    /// Gradient alpha at the top and bottom edges.
    pub gradient_edge_alpha: f32,
    /// Gradient alpha across the middle band.
    pub gradient_mid_alpha: f32,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            quote_font_frac: 0.055,
            line_height_mul: 1.4,
            quote_max_width_frac: 0.8,
            quote_anchor_frac: 0.45,
            shadow_offset_frac: 0.002,
            shadow_passes: 3,
            shadow_alpha: 0.25,
            author_font_frac: 0.04,
            author_anchor_frac: 0.65,
            author_alpha: 0.8,
            watermark_font_frac: 0.025,
            watermark_anchor_frac: 0.95,
            watermark_alpha: 0.5,
            gradient_edge_alpha: 0.6,
            gradient_mid_alpha: 0.2,
        }
    }
}

impl OverlayLayout {
    pub fn validate(&self) -> ReelResult<()> {
        let positive = [
            ("quote_font_frac", self.quote_font_frac),
            ("line_height_mul", self.line_height_mul),
            ("quote_max_width_frac", self.quote_max_width_frac),
            ("author_font_frac", self.author_font_frac),
            ("watermark_font_frac", self.watermark_font_frac),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReelError::validation(format!(
                    "overlay {name} must be finite and > 0"
                )));
            }
        }
        let unit = [
            ("quote_anchor_frac", self.quote_anchor_frac),
            ("author_anchor_frac", self.author_anchor_frac),
            ("watermark_anchor_frac", self.watermark_anchor_frac),
            ("shadow_offset_frac", self.shadow_offset_frac),
            ("shadow_alpha", f64::from(self.shadow_alpha)),
            ("author_alpha", f64::from(self.author_alpha)),
            ("watermark_alpha", f64::from(self.watermark_alpha)),
            ("gradient_edge_alpha", f64::from(self.gradient_edge_alpha)),
            ("gradient_mid_alpha", f64::from(self.gradient_mid_alpha)),
        ];
        for (name, v) in unit {
            if !(0.0..=1.0).contains(&v) {
                return Err(ReelError::validation(format!(
                    "overlay {name} must be within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Non-image styling of a reel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Brand label drawn near the bottom edge. Empty disables it.
    pub watermark: String,
    pub layout: OverlayLayout,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            watermark: "quotereel".to_string(),
            layout: OverlayLayout::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/settings.rs"]
mod tests;
