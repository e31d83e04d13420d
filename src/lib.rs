//! detselect picks a fixed-size, diverse subset of images from a stream using
//! object-detection output as the selection signal.
//!
//! Half of the selection (rounded up) favors images with many detections of
//! the configured labels; the other half favors images whose detections have
//! unusually low average confidence. Images pushed out of the first pool get
//! one chance at the second. The detector itself is supplied by the caller
//! through the [`Detector`] trait; parallel scoring is available via the
//! `rayon` feature.

#[cfg(feature = "rayon")]
pub mod batch;
pub mod config;
pub mod detect;
pub mod lowlevel;
mod pool;
pub mod score;
pub mod selector;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use detect::io;

pub use config::{LabelSet, SelectorConfig, DEFAULT_MULTIPLIER};
pub use detect::{Detection, Detector, DetectorError};
pub use score::{score_detections, ImageMetrics, NO_DETECTION_SCORE};
pub use selector::{Cascade, Placement, SelectionStats, Selector, SubmitOutcome};
pub use util::{SelectError, SelectResult};

#[cfg(feature = "rayon")]
pub use batch::score_batch;
