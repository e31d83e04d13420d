//! Numeric helpers for capacity planning and scoring.

/// Splits a selection size into `(count_capacity, score_capacity)`.
///
/// The count pool receives the larger half when the size is odd.
pub(crate) fn split_capacity(selection_size: usize) -> (usize, usize) {
    let score_capacity = selection_size / 2;
    (selection_size - score_capacity, score_capacity)
}

/// Mean of `sum` over `weight`, or `fallback` when nothing was counted.
pub(crate) fn mean_or(sum: f32, weight: f32, fallback: f32) -> f32 {
    if weight > 0.0 {
        sum / weight
    } else {
        fallback
    }
}
