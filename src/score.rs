//! Per-image scoring.
//!
//! Reduces a detection list to a weighted count of counted labels and the
//! mean confidence of those detections.

use crate::config::LabelSet;
use crate::detect::Detection;
use crate::util::math::mean_or;
use crate::util::{SelectError, SelectResult};

/// Average score reported for images with no counted detections.
pub const NO_DETECTION_SCORE: f32 = 1.0;

/// Selection metrics for a single image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageMetrics {
    /// Sum of label multipliers over counted detections.
    pub weighted_count: f32,
    /// Sum of counted confidences divided by `weighted_count`.
    pub average_score: f32,
}

impl ImageMetrics {
    /// Metrics of an image without any counted detection.
    pub const EMPTY: Self = Self {
        weighted_count: 0.0,
        average_score: NO_DETECTION_SCORE,
    };
}

/// Scores a detection list against the configured labels.
///
/// Detections whose label is not in `labels` are ignored. The average divides
/// by the weighted count, so multipliers above one pull the average down.
pub fn score_detections(detections: &[Detection], labels: &LabelSet) -> ImageMetrics {
    let mut weighted_count = 0.0f32;
    let mut score_sum = 0.0f32;
    for det in detections {
        if let Some(multiplier) = labels.multiplier(&det.label) {
            weighted_count += multiplier;
            score_sum += det.confidence;
        }
    }

    ImageMetrics {
        weighted_count,
        average_score: mean_or(score_sum, weighted_count, NO_DETECTION_SCORE),
    }
}

/// Rejects confidences outside `[0, 1]` among counted detections.
pub(crate) fn validate_detections(
    detections: &[Detection],
    labels: &LabelSet,
) -> SelectResult<()> {
    for det in detections {
        if !labels.contains(&det.label) {
            continue;
        }
        if !(0.0..=1.0).contains(&det.confidence) {
            return Err(SelectError::InvalidConfidence {
                label: det.label.clone(),
                value: det.confidence,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dets(items: &[(&str, f32)]) -> Vec<Detection> {
        items.iter().map(|&(l, c)| Detection::new(l, c)).collect()
    }

    #[test]
    fn counts_only_selected_labels() {
        let labels = LabelSet::new(["cat", "dog"]).unwrap();
        let detections = dets(&[("cat", 0.9), ("car", 0.2), ("dog", 0.8)]);
        let metrics = score_detections(&detections, &labels);
        assert!((metrics.weighted_count - 2.0).abs() < 1e-6);
        assert!((metrics.average_score - 0.85).abs() < 1e-6);
    }

    #[test]
    fn no_counted_detections_yield_neutral_score() {
        let labels = LabelSet::new(["cat"]).unwrap();
        assert_eq!(score_detections(&[], &labels), ImageMetrics::EMPTY);
        assert_eq!(
            score_detections(&dets(&[("truck", 0.3)]), &labels),
            ImageMetrics::EMPTY
        );
    }

    #[test]
    fn multipliers_weight_count_and_average() {
        let labels = LabelSet::with_multipliers(["person", "bicycle"], &[1.0, 3.0]).unwrap();
        let metrics = score_detections(&dets(&[("person", 0.6), ("bicycle", 0.6)]), &labels);
        assert!((metrics.weighted_count - 4.0).abs() < 1e-6);
        assert!((metrics.average_score - 0.3).abs() < 1e-6);
    }

    #[test]
    fn validate_ignores_uncounted_labels() {
        let labels = LabelSet::new(["cat"]).unwrap();
        assert!(validate_detections(&dets(&[("car", 7.0), ("cat", 0.5)]), &labels).is_ok());
        let err = validate_detections(&dets(&[("cat", 1.5)]), &labels).unwrap_err();
        assert_eq!(
            err,
            SelectError::InvalidConfidence {
                label: "cat".to_string(),
                value: 1.5,
            }
        );
    }
}
