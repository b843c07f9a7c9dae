//! Error types for the card codec.

use thiserror::Error;

/// Errors that can occur while rendering or reading a card.
#[derive(Debug, Error)]
pub enum CardError {
    /// A configured file does not exist, or no path was configured.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// The grid does not fit the image, or the geometry is unusable.
    #[error("image bounds: {0}")]
    ImageBounds(String),

    /// The hash does not fill the grid exactly.
    #[error("hash length mismatch: expected {expected} bytes, got {actual}")]
    HashLength { expected: usize, actual: usize },

    /// A mask was built for a different grid.
    #[error("mask mismatch: expected {expected} bytes, got {actual}")]
    MaskMismatch { expected: usize, actual: usize },

    /// PNG decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for card operations.
pub type Result<T> = std::result::Result<T, CardError>;
