use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::font::FontFace;
use crate::assets::image::ReelImage;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::collection::{ImageCollection, MAX_IMAGES};
use crate::scene::quote::Quote;
use crate::scene::settings::{OverlayStyle, ReelSettings};

/// Styling section of a manifest: overlay style plus an optional font file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestStyle {
    #[serde(flatten)]
    pub overlay: OverlayStyle,
    /// Font file used for all text. Relative paths resolve against the manifest directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

/// JSON description of one reel, as consumed by the CLI.
///
/// ```json
/// {
///   "quote": { "text": "Stay hungry.", "author": "Steve Jobs" },
///   "images": ["a.jpg", "b.jpg"],
///   "settings": { "seconds_per_image": 2.0, "transition": "slide", "quality": "hd" },
///   "style": { "watermark": "my brand", "font": "fonts/Inter.ttf" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReelManifest {
    pub quote: Quote,
    pub images: Vec<PathBuf>,
    #[serde(default)]
    pub settings: ReelSettings,
    #[serde(default)]
    pub style: ManifestStyle,
}

/// A manifest with every referenced file loaded.
#[derive(Clone, Debug)]
pub struct LoadedReel {
    pub collection: ImageCollection,
    pub quote: Quote,
    pub settings: ReelSettings,
    pub style: OverlayStyle,
    pub font: Option<FontFace>,
}

impl ReelManifest {
    /// Parse a manifest from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::validation(format!("parse reel manifest JSON: {e}")))
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open reel manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check settings, style and image count without touching the filesystem.
    ///
    /// Fewer than the minimum number of images is allowed here; the pipeline rejects it.
    pub fn validate(&self) -> ReelResult<()> {
        self.settings.validate()?;
        self.style.overlay.layout.validate()?;
        if self.images.len() > MAX_IMAGES {
            return Err(ReelError::CollectionFull { max: MAX_IMAGES });
        }
        Ok(())
    }

    /// Read every image and the font, resolving relative paths against `base_dir`.
    ///
    /// Images are read but not decoded.
    #[tracing::instrument(skip(self), fields(images = self.images.len()))]
    pub fn load(&self, base_dir: &Path) -> ReelResult<LoadedReel> {
        self.validate()?;

        let mut collection = ImageCollection::new();
        for rel in &self.images {
            collection.add(ReelImage::from_path(resolve(base_dir, rel))?)?;
        }
        let font = self
            .style
            .font
            .as_ref()
            .map(|p| FontFace::from_path(resolve(base_dir, p)))
            .transpose()?;

        Ok(LoadedReel {
            collection,
            quote: self.quote.clone(),
            settings: self.settings,
            style: self.style.overlay.clone(),
            font,
        })
    }
}

fn resolve(base_dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/manifest.rs"]
mod tests;
