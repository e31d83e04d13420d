//! Label and selection configuration.
//!
//! A `LabelSet` owns the ordered list of counted labels together with their
//! multipliers and a label-to-index lookup built once at validation time.
//! `SelectorConfig` is the plain, unvalidated description a caller hands to
//! `Selector::new`.

use crate::util::{SelectError, SelectResult};
use std::collections::HashMap;

/// Multiplier used for every label when none are configured.
pub const DEFAULT_MULTIPLIER: f32 = 1.0;

/// Validated, ordered set of counted labels with per-label multipliers.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSet {
    entries: Vec<(String, f32)>,
    index: HashMap<String, usize>,
}

impl LabelSet {
    /// Builds a label set with the default multiplier for every label.
    pub fn new<I, S>(labels: I) -> SelectResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self::build(labels, None)
    }

    /// Builds a label set with multipliers aligned positionally with `labels`.
    pub fn with_multipliers<I, S>(labels: I, multipliers: &[f32]) -> SelectResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self::build(labels, Some(multipliers))
    }

    fn build(labels: Vec<String>, multipliers: Option<&[f32]>) -> SelectResult<Self> {
        if labels.is_empty() {
            return Err(SelectError::EmptyLabelSet);
        }
        if let Some(multipliers) = multipliers {
            if multipliers.len() != labels.len() {
                return Err(SelectError::MultiplierCountMismatch {
                    labels: labels.len(),
                    multipliers: multipliers.len(),
                });
            }
        }

        let mut entries = Vec::with_capacity(labels.len());
        let mut index = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.into_iter().enumerate() {
            let multiplier = multipliers.map_or(DEFAULT_MULTIPLIER, |m| m[idx]);
            if !(multiplier.is_finite() && multiplier > 0.0) {
                return Err(SelectError::InvalidMultiplier {
                    label,
                    value: multiplier,
                });
            }
            if index.insert(label.clone(), idx).is_some() {
                return Err(SelectError::DuplicateLabel { label });
            }
            entries.push((label, multiplier));
        }

        Ok(Self { entries, index })
    }

    /// Returns a copy of this label set with new multipliers.
    ///
    /// `None` restores the default multiplier for every label.
    pub fn remultiplied(&self, multipliers: Option<&[f32]>) -> SelectResult<Self> {
        let labels = self.entries.iter().map(|(label, _)| label.clone()).collect();
        Self::build(labels, multipliers)
    }

    /// Returns the multiplier for `label`, or `None` if the label is not counted.
    pub fn multiplier(&self, label: &str) -> Option<f32> {
        self.index.get(label).map(|&idx| self.entries[idx].1)
    }

    /// Returns true if `label` is part of the selection.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Iterates labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Iterates `(label, multiplier)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(label, m)| (label.as_str(), *m))
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unvalidated selector configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorConfig {
    /// Labels whose detections are counted, in lookup order.
    pub labels: Vec<String>,
    /// Total number of images to select.
    pub selection_size: usize,
    /// Optional multipliers aligned positionally with `labels`.
    pub multipliers: Option<Vec<f32>>,
}

impl SelectorConfig {
    /// Creates a config with default multipliers.
    pub fn new<I, S>(labels: I, selection_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            selection_size,
            multipliers: None,
        }
    }

    /// Sets per-label multipliers.
    pub fn with_multipliers(mut self, multipliers: Vec<f32>) -> Self {
        self.multipliers = Some(multipliers);
        self
    }

    /// Validates the label configuration.
    pub fn label_set(&self) -> SelectResult<LabelSet> {
        LabelSet::build(self.labels.clone(), self.multipliers.as_deref())
    }
}

/// Rejects selection sizes that cannot hold any image.
pub(crate) fn validate_selection_size(size: usize) -> SelectResult<usize> {
    if size == 0 {
        return Err(SelectError::InvalidSelectionSize { size });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_multipliers_are_one() {
        let set = LabelSet::new(["cat", "dog"]).unwrap();
        assert_eq!(set.multiplier("cat"), Some(1.0));
        assert_eq!(set.multiplier("dog"), Some(1.0));
        assert_eq!(set.multiplier("car"), None);
        assert_eq!(set.labels().collect::<Vec<_>>(), vec!["cat", "dog"]);
    }

    #[test]
    fn multipliers_follow_label_order() {
        let set = LabelSet::with_multipliers(["person", "bicycle"], &[1.0, 4.0]).unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![("person", 1.0), ("bicycle", 4.0)]
        );
    }

    #[test]
    fn remultiplied_keeps_labels_and_resets_to_defaults() {
        let set = LabelSet::with_multipliers(["a", "b"], &[2.0, 3.0]).unwrap();
        let reset = set.remultiplied(None).unwrap();
        assert_eq!(reset.iter().collect::<Vec<_>>(), vec![("a", 1.0), ("b", 1.0)]);
        let err = set.remultiplied(Some(&[1.0])).unwrap_err();
        assert_eq!(
            err,
            SelectError::MultiplierCountMismatch {
                labels: 2,
                multipliers: 1,
            }
        );
    }

    #[test]
    fn rejects_nan_multiplier() {
        let err = LabelSet::with_multipliers(["a"], &[f32::NAN]).unwrap_err();
        assert!(matches!(err, SelectError::InvalidMultiplier { .. }));
    }

    #[test]
    fn selection_size_zero_is_rejected() {
        assert_eq!(
            validate_selection_size(0),
            Err(SelectError::InvalidSelectionSize { size: 0 })
        );
        assert_eq!(validate_selection_size(3), Ok(3));
    }
}
