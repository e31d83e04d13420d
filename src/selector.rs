//! Dual-pool online selector.
//!
//! Every submitted image is first offered to the count pool. If it takes a
//! slot, the slot's previous occupant (if any) becomes the candidate for the
//! score pool; otherwise the image itself is the candidate. At most one pool
//! admits the submitted image per call.

use crate::config::{validate_selection_size, LabelSet, SelectorConfig};
use crate::detect::{Detection, Detector, DetectorError};
use crate::pool::{CountEntry, CountOffer, CountPool, ScoreEntry, ScoreOffer, ScorePool};
use crate::score::{score_detections, validate_detections, ImageMetrics};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::math::split_capacity;
use crate::util::{SelectError, SelectResult};

/// Where an image ended up after a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Retained for its weighted count.
    CountPool,
    /// Retained for its low average score.
    ScorePool,
    /// Not retained by either pool.
    Discarded,
}

/// An image pushed out of the count pool and offered to the score pool.
#[derive(Clone, Debug, PartialEq)]
pub struct Cascade {
    /// Identifier of the evicted count-pool image.
    pub image_id: String,
    /// Either `ScorePool` or `Discarded`.
    pub placement: Placement,
}

/// What a single `submit` call changed.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitOutcome {
    /// Placement of the submitted image.
    pub placement: Placement,
    /// Count-pool eviction that cascaded into the score pool.
    pub cascade: Option<Cascade>,
    /// Image removed from the score pool to make room.
    pub dropped: Option<String>,
}

/// Running counters since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Images passed to `submit`.
    pub submitted: usize,
    /// Submissions admitted into the count pool.
    pub count_admissions: usize,
    /// Candidates admitted into the score pool, cascades included.
    pub score_admissions: usize,
    /// Candidates rejected by the score pool, cascades included.
    pub discarded: usize,
    /// Images skipped because detection failed.
    pub detection_failures: usize,
}

/// Selects a fixed-size subset of images from a stream of detections.
#[derive(Clone, Debug)]
pub struct Selector {
    labels: LabelSet,
    selection_size: usize,
    count_pool: CountPool,
    score_pool: ScorePool,
    stats: SelectionStats,
}

impl Selector {
    /// Creates a selector from an unvalidated config.
    pub fn new(config: SelectorConfig) -> SelectResult<Self> {
        let labels = config.label_set()?;
        Self::with_labels(labels, config.selection_size)
    }

    /// Creates a selector from a validated label set.
    pub fn with_labels(labels: LabelSet, selection_size: usize) -> SelectResult<Self> {
        let selection_size = validate_selection_size(selection_size)?;
        let (count_capacity, score_capacity) = split_capacity(selection_size);
        Ok(Self {
            labels,
            selection_size,
            count_pool: CountPool::new(count_capacity),
            score_pool: ScorePool::new(score_capacity),
            stats: SelectionStats::default(),
        })
    }

    /// Clears both pools for a new selection run.
    ///
    /// `multipliers` are aligned with the configured labels; `None` restores a
    /// multiplier of one for every label. On error the selector is unchanged.
    pub fn reset(
        &mut self,
        selection_size: usize,
        multipliers: Option<&[f32]>,
    ) -> SelectResult<()> {
        let _span = trace_span!("reset", selection_size = selection_size).entered();
        let labels = self.labels.remultiplied(multipliers)?;
        *self = Self::with_labels(labels, selection_size)?;
        trace_event!(
            "pools_reset",
            count_capacity = self.count_capacity(),
            score_capacity = self.score_capacity()
        );
        Ok(())
    }

    /// Applies pre-computed metrics for one image.
    pub fn submit(&mut self, image_id: impl Into<String>, metrics: ImageMetrics) -> SubmitOutcome {
        let image_id = image_id.into();
        self.stats.submitted += 1;

        let entry = CountEntry {
            image_id,
            weighted_count: metrics.weighted_count,
            average_score: metrics.average_score,
        };
        let (admitted, candidate) = match self.count_pool.offer(entry) {
            CountOffer::Admitted { evicted } => {
                self.stats.count_admissions += 1;
                trace_event!(
                    "count_pool_admit",
                    weighted_count = metrics.weighted_count,
                    lowest_count = self.count_pool.lowest_count()
                );
                let candidate = evicted.map(|e| ScoreEntry {
                    image_id: e.image_id,
                    average_score: e.average_score,
                });
                (true, candidate)
            }
            CountOffer::Rejected(entry) => (
                false,
                Some(ScoreEntry {
                    image_id: entry.image_id,
                    average_score: entry.average_score,
                }),
            ),
        };

        let mut outcome = SubmitOutcome {
            placement: Placement::CountPool,
            cascade: None,
            dropped: None,
        };
        if let Some(candidate) = candidate {
            let (candidate_id, placement) = self.offer_score(candidate, &mut outcome.dropped);
            if admitted {
                outcome.cascade = Some(Cascade {
                    image_id: candidate_id,
                    placement,
                });
            } else {
                outcome.placement = placement;
            }
        }
        outcome
    }

    fn offer_score(
        &mut self,
        candidate: ScoreEntry,
        dropped: &mut Option<String>,
    ) -> (String, Placement) {
        let average_score = candidate.average_score;
        let image_id = candidate.image_id.clone();
        match self.score_pool.offer(candidate) {
            ScoreOffer::Admitted { evicted } => {
                self.stats.score_admissions += 1;
                trace_event!("score_pool_admit", average_score = average_score);
                *dropped = evicted.map(|e| e.image_id);
                (image_id, Placement::ScorePool)
            }
            ScoreOffer::Rejected(_) => {
                self.stats.discarded += 1;
                trace_event!("candidate_discarded", average_score = average_score);
                (image_id, Placement::Discarded)
            }
        }
    }

    /// Scores a detection list and submits it.
    ///
    /// Counted detections must have confidences in `[0, 1]`; otherwise the
    /// pools are left untouched.
    pub fn submit_detections(
        &mut self,
        image_id: impl Into<String>,
        detections: &[Detection],
    ) -> SelectResult<SubmitOutcome> {
        let metrics = metrics_for(&self.labels, detections)?;
        Ok(self.submit(image_id, metrics))
    }

    /// Runs `detector` on `image`, scores the result and submits it.
    ///
    /// A detector error is reported as `SelectError::DetectionFailure` and the
    /// image is not submitted.
    pub fn submit_image<D: Detector>(
        &mut self,
        detector: &D,
        image: &D::Image,
        image_id: impl Into<String>,
    ) -> SelectResult<SubmitOutcome> {
        let image_id = image_id.into();
        let _span = trace_span!("submit_image", image_id = image_id.as_str()).entered();
        let detected = detector.detect(image);
        let metrics = self.prepare(&image_id, detected);
        self.apply(image_id, metrics)
    }

    /// Turns a detector result into metrics without touching the pools.
    pub(crate) fn prepare(
        &self,
        image_id: &str,
        detected: Result<Vec<Detection>, DetectorError>,
    ) -> SelectResult<ImageMetrics> {
        let detections = detected.map_err(|err| SelectError::DetectionFailure {
            image_id: image_id.to_owned(),
            reason: err.to_string(),
        })?;
        metrics_for(&self.labels, &detections)
    }

    /// Submits prepared metrics, recording detection failures.
    pub(crate) fn apply(
        &mut self,
        image_id: String,
        metrics: SelectResult<ImageMetrics>,
    ) -> SelectResult<SubmitOutcome> {
        match metrics {
            Ok(metrics) => Ok(self.submit(image_id, metrics)),
            Err(err) => {
                if let SelectError::DetectionFailure { reason, .. } = &err {
                    self.stats.detection_failures += 1;
                    trace_warn!(
                        "detection_failed",
                        image_id = image_id.as_str(),
                        reason = reason.as_str()
                    );
                }
                Err(err)
            }
        }
    }

    /// Returns count-pool ids followed by score-pool ids.
    ///
    /// Slots that were never filled appear as `None`.
    pub fn get_selected(&self) -> Vec<Option<String>> {
        self.count_pool
            .image_ids()
            .chain(self.score_pool.image_ids())
            .map(|id| id.map(str::to_owned))
            .collect()
    }

    /// Returns the ids of filled slots in `get_selected` order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.count_pool
            .image_ids()
            .chain(self.score_pool.image_ids())
            .flatten()
            .map(str::to_owned)
            .collect()
    }

    /// Returns the count pool.
    pub fn count_pool(&self) -> &CountPool {
        &self.count_pool
    }

    /// Returns the score pool.
    pub fn score_pool(&self) -> &ScorePool {
        &self.score_pool
    }

    /// Returns counters accumulated since the last reset.
    pub fn stats(&self) -> SelectionStats {
        self.stats
    }

    /// Returns the configured labels and multipliers.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Returns the total selection size.
    pub fn selection_size(&self) -> usize {
        self.selection_size
    }

    /// Returns the number of count-pool slots.
    pub fn count_capacity(&self) -> usize {
        self.count_pool.capacity()
    }

    /// Returns the number of score-pool slots.
    pub fn score_capacity(&self) -> usize {
        self.score_pool.capacity()
    }
}

pub(crate) fn metrics_for(
    labels: &LabelSet,
    detections: &[Detection],
) -> SelectResult<ImageMetrics> {
    validate_detections(detections, labels)?;
    Ok(score_detections(detections, labels))
}
