use std::sync::Arc;

use crate::assets::image::ReelImage;
use crate::foundation::error::{ReelError, ReelResult};

/// Fewest images a reel can be encoded from.
pub const MIN_IMAGES: usize = 2;
/// Most images a collection accepts.
pub const MAX_IMAGES: usize = 20;

/// Direction of a single-step reorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards index 0.
    Left,
    /// Towards the end.
    Right,
}

/// Ordered, bounded list of background images plus the preview selection.
#[derive(Clone, Debug, Default)]
pub struct ImageCollection {
    images: Vec<ReelImage>,
    selected: usize,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from an ordered list, failing if it exceeds [`MAX_IMAGES`].
    pub fn from_images(images: impl IntoIterator<Item = ReelImage>) -> ReelResult<Self> {
        let mut out = Self::new();
        for image in images {
            out.add(image)?;
        }
        Ok(out)
    }

    /// Append `image` unless the collection is full.
    pub fn add(&mut self, image: ReelImage) -> ReelResult<()> {
        if self.images.len() >= MAX_IMAGES {
            return Err(ReelError::CollectionFull { max: MAX_IMAGES });
        }
        self.images.push(image);
        Ok(())
    }

    /// Remove and return the image at `index`.
    ///
    /// A selection after `index` shifts down with its image. Removing the selected image itself
    /// selects whatever now occupies that slot, clamped to the last image (`0` when empty).
    pub fn remove(&mut self, index: usize) -> ReelResult<ReelImage> {
        self.check_index(index)?;
        let removed = self.images.remove(index);
        if self.selected > index {
            self.selected -= 1;
        } else if self.selected == index {
            self.selected = self.selected.min(self.images.len().saturating_sub(1));
        }
        Ok(removed)
    }

    /// Swap the image at `index` with its neighbour in `direction`.
    ///
    /// Returns `false` without changing anything when the neighbour would be out of bounds.
    pub fn reorder(&mut self, index: usize, direction: Direction) -> ReelResult<bool> {
        self.check_index(index)?;
        let other = match direction {
            Direction::Left if index > 0 => index - 1,
            Direction::Right if index + 1 < self.images.len() => index + 1,
            _ => return Ok(false),
        };
        self.images.swap(index, other);
        Ok(true)
    }

    /// Remove every image and reset the selection.
    pub fn clear(&mut self) {
        self.images.clear();
        self.selected = 0;
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReelImage> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReelImage> {
        self.images.iter()
    }

    /// Index of the image shown in the preview.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The image shown in the preview, if any.
    pub fn selected_image(&self) -> Option<&ReelImage> {
        self.images.get(self.selected)
    }

    /// Point the preview at `index`.
    pub fn select(&mut self, index: usize) -> ReelResult<()> {
        self.check_index(index)?;
        self.selected = index;
        Ok(())
    }

    /// Fail with [`ReelError::InsufficientImages`] when fewer than [`MIN_IMAGES`] are present.
    pub fn ensure_ready_for_encoding(&self) -> ReelResult<()> {
        if self.images.len() < MIN_IMAGES {
            return Err(ReelError::InsufficientImages {
                count: self.images.len(),
                min: MIN_IMAGES,
            });
        }
        Ok(())
    }

    /// Freeze the current order into an immutable snapshot for encoding.
    pub fn snapshot(&self) -> ImageSnapshot {
        ImageSnapshot(self.images.iter().cloned().collect())
    }

    fn check_index(&self, index: usize) -> ReelResult<()> {
        if index >= self.images.len() {
            return Err(ReelError::IndexOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        Ok(())
    }
}

/// Immutable, cheaply clonable view of a collection taken at encode start.
///
/// Later edits to the [`ImageCollection`] never affect a running job.
#[derive(Clone, Debug)]
pub struct ImageSnapshot(Arc<[ReelImage]>);

impl ImageSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReelImage> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[ReelImage] {
        &self.0
    }
}

/// Snapshots built this way skip the collection's size cap; the pipeline checks both bounds.
impl From<Vec<ReelImage>> for ImageSnapshot {
    fn from(images: Vec<ReelImage>) -> Self {
        Self(images.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/collection.rs"]
mod tests;
