//! Detection adapter contract.
//!
//! The selector does not run a model itself. Callers plug in any object
//! detector by implementing [`Detector`]; confidence thresholds and
//! non-maximum suppression belong to that implementation.

#[cfg(feature = "image-io")]
pub mod io;

use std::error::Error;

/// Boxed error returned by detector implementations.
pub type DetectorError = Box<dyn Error + Send + Sync>;

/// One detected object: its class label and confidence in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Class label reported by the detector.
    pub label: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Detection {
    /// Creates a detection.
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

impl<S: Into<String>> From<(S, f32)> for Detection {
    fn from((label, confidence): (S, f32)) -> Self {
        Self::new(label, confidence)
    }
}

/// External object detector.
///
/// Implementations must be deterministic for a given image only as far as the
/// underlying model is; the selector treats each call as independent.
pub trait Detector {
    /// Image type accepted by the detector.
    type Image: ?Sized;

    /// Runs detection on a single image.
    fn detect(&self, image: &Self::Image) -> Result<Vec<Detection>, DetectorError>;
}

impl<D: Detector + ?Sized> Detector for &D {
    type Image = D::Image;

    fn detect(&self, image: &Self::Image) -> Result<Vec<Detection>, DetectorError> {
        (**self).detect(image)
    }
}
