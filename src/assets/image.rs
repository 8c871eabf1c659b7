use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::assets::decode::{PreparedImage, decode_image, prepare_straight_rgba8};
use crate::foundation::error::ReelResult;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ReelImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

enum Source {
    Encoded(Vec<u8>),
    Decoded(PreparedImage),
}

struct Inner {
    id: ImageId,
    label: String,
    source: Source,
}

/// Opaque handle to one background image.
///
/// Handles are cheap to clone and immutable. An encoded source stays encoded: every call to
/// [`ReelImage::decoded`] decodes afresh and hands the pixels to the caller, so a collection
/// never pins decoded rasters. The renderer keeps its own bounded cache of the images it is
/// currently drawing.
#[derive(Clone)]
pub struct ReelImage {
    inner: Arc<Inner>,
}

impl ReelImage {
    /// Wrap encoded image bytes (PNG, JPEG, WebP, ...). Decoding is deferred.
    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(label.into(), Source::Encoded(bytes.into()))
    }

    /// Read an encoded image from disk. Decoding is deferred.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Wrap already-decoded straight-alpha RGBA8 pixels.
    pub fn from_rgba8(
        label: impl Into<String>,
        width: u32,
        height: u32,
        rgba8: Vec<u8>,
    ) -> ReelResult<Self> {
        let prepared = prepare_straight_rgba8(width, height, rgba8)?;
        Ok(Self::new(label.into(), Source::Decoded(prepared)))
    }

    fn new(label: String, source: Source) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)),
                label,
                source,
            }),
        }
    }

    /// Stable identity used for caching decoded paints.
    pub fn id(&self) -> ImageId {
        self.inner.id
    }

    /// Human-readable label (usually the source path).
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Return `true` when the handle holds pixels rather than encoded bytes.
    pub fn is_decoded(&self) -> bool {
        matches!(self.inner.source, Source::Decoded(_))
    }

    /// Natural size in pixels. Encoded sources are probed from their header without decoding.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        match &self.inner.source {
            Source::Decoded(p) => Some((p.width, p.height)),
            Source::Encoded(bytes) => image::ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .ok()?
                .into_dimensions()
                .ok(),
        }
    }

    /// Decoded pixels. Encoded sources are decoded on every call and nothing is retained.
    pub fn decoded(&self) -> ReelResult<PreparedImage> {
        let bytes = match &self.inner.source {
            Source::Decoded(prepared) => return Ok(prepared.clone()),
            Source::Encoded(bytes) => bytes,
        };
        let prepared = decode_image(bytes)?;
        tracing::debug!(
            image = %self.inner.label,
            width = prepared.width,
            height = prepared.height,
            "decoded image"
        );
        Ok(prepared)
    }
}

impl PartialEq for ReelImage {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ReelImage {}

impl std::fmt::Debug for ReelImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReelImage")
            .field("id", &self.inner.id.0)
            .field("label", &self.inner.label)
            .field("size", &self.natural_size())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
