//! Error types for detselect.

use thiserror::Error;

/// Result alias for detselect operations.
pub type SelectResult<T> = std::result::Result<T, SelectError>;

/// Errors that can occur when configuring or feeding a selector.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SelectError {
    /// No labels were configured for counting.
    #[error("selected label set is empty")]
    EmptyLabelSet,
    /// A label appears more than once in the label set.
    #[error("duplicate label in selection: {label}")]
    DuplicateLabel { label: String },
    /// The requested selection size cannot hold any image.
    #[error("invalid selection size {size}: must be at least 1")]
    InvalidSelectionSize { size: usize },
    /// Multipliers are not aligned with the selected labels.
    #[error("got {multipliers} label multipliers for {labels} selected labels")]
    MultiplierCountMismatch { labels: usize, multipliers: usize },
    /// A label multiplier is zero, negative or not finite.
    #[error("invalid multiplier {value} for label {label}: must be positive and finite")]
    InvalidMultiplier { label: String, value: f32 },
    /// A detection confidence lies outside `[0, 1]`.
    #[error("invalid confidence {value} for label {label}: must lie in [0, 1]")]
    InvalidConfidence { label: String, value: f32 },
    /// The external detector could not process an image.
    #[error("detection failed for image {image_id}: {reason}")]
    DetectionFailure { image_id: String, reason: String },
    /// Image decoding or loading failed.
    #[cfg(feature = "image-io")]
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
}
