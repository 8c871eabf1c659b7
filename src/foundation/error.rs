/// Result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Every failure the reel compositor can surface.
///
/// Cancellation is deliberately absent: a cancelled job is a terminal outcome, not an error
/// (see [`crate::JobOutcome`]).
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("collection full: at most {max} images")]
    CollectionFull { max: usize },

    #[error("index {index} out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("insufficient images: got {count}, need at least {min}")]
    InsufficientImages { count: usize, min: usize },

    #[error("image decode failure (image {index}): {reason}")]
    ImageDecode { index: usize, reason: String },

    #[error("encoder init failure: {0}")]
    EncoderInit(String),

    #[error("encoder submit failure: {0}")]
    EncoderSubmit(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn image_decode(index: usize, reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            index,
            reason: reason.into(),
        }
    }

    pub fn encoder_init(msg: impl Into<String>) -> Self {
        Self::EncoderInit(msg.into())
    }

    pub fn encoder_submit(msg: impl Into<String>) -> Self {
        Self::EncoderSubmit(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Return `true` for failures raised while opening an encoder backend.
    pub fn is_encoder_init(&self) -> bool {
        matches!(self, Self::EncoderInit(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
