//! Rayon-parallel scoring with serialized submission (feature-gated).
//!
//! Detection and scoring are pure per image and run in parallel. Pool updates
//! depend on the running minimum and maximum, so they are applied one by one
//! in input order; the resulting pools match a sequential run exactly.

use crate::config::LabelSet;
use crate::detect::{Detection, Detector};
use crate::score::{score_detections, ImageMetrics};
use crate::selector::{metrics_for, Selector, SubmitOutcome};
use crate::trace::{trace_event, trace_span};
use crate::util::SelectResult;
use rayon::prelude::*;

/// Scores many detection lists in parallel, preserving input order.
pub fn score_batch(batch: &[Vec<Detection>], labels: &LabelSet) -> Vec<ImageMetrics> {
    batch
        .par_iter()
        .map(|detections| score_detections(detections, labels))
        .collect()
}

impl Selector {
    /// Validates and scores `batch` in parallel, then submits it in order.
    ///
    /// The batch is all-or-nothing: if any counted confidence is invalid the
    /// first such error is returned and no image is submitted.
    pub fn submit_batch<S>(
        &mut self,
        batch: &[(S, Vec<Detection>)],
    ) -> SelectResult<Vec<SubmitOutcome>>
    where
        S: AsRef<str> + Sync,
    {
        let _span = trace_span!("submit_batch", images = batch.len()).entered();
        let labels = self.labels();
        let metrics = batch
            .par_iter()
            .map(|(_, detections)| metrics_for(labels, detections))
            .collect::<SelectResult<Vec<_>>>()?;

        let outcomes = batch
            .iter()
            .zip(metrics)
            .map(|((image_id, _), metrics)| self.submit(image_id.as_ref(), metrics))
            .collect();
        Ok(outcomes)
    }

    /// Runs `detector` over `images` in parallel, then submits in order.
    ///
    /// Each image yields its own result; failed images are skipped and do not
    /// affect the pools.
    pub fn submit_images_par<D, S>(
        &mut self,
        detector: &D,
        images: &[(S, &D::Image)],
    ) -> Vec<SelectResult<SubmitOutcome>>
    where
        D: Detector + Sync,
        D::Image: Sync,
        S: AsRef<str> + Sync,
    {
        let _span = trace_span!("submit_images_par", images = images.len()).entered();
        let prepared: Vec<_> = {
            let this = &*self;
            images
                .par_iter()
                .map(|(image_id, image)| this.prepare(image_id.as_ref(), detector.detect(image)))
                .collect()
        };

        let results: Vec<_> = images
            .iter()
            .zip(prepared)
            .map(|((image_id, _), metrics)| self.apply(image_id.as_ref().to_owned(), metrics))
            .collect();
        trace_event!(
            "batch_applied",
            failures = results.iter().filter(|r| r.is_err()).count()
        );
        results
    }
}
