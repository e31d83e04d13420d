//! Python bindings for detselect.
//!
//! Exposes the dual-pool `Selector` to Python. Detection can either be done
//! in Python and passed in as `(label, confidence)` pairs, or delegated to a
//! Python callable given at construction time.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use detselect::{
    Detection, Detector, DetectorError, Placement, SelectError, Selector as RustSelector,
    SelectorConfig, SubmitOutcome,
};

/// Convert a SelectError to a Python exception.
fn to_py_err(err: SelectError) -> PyErr {
    match err {
        SelectError::DetectionFailure { .. } => PyRuntimeError::new_err(err.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn placement_name(placement: Placement) -> &'static str {
    match placement {
        Placement::CountPool => "count",
        Placement::ScorePool => "score",
        Placement::Discarded => "discarded",
    }
}

/// Result of submitting one image.
#[pyclass]
#[derive(Clone)]
pub struct Outcome {
    /// "count", "score" or "discarded".
    #[pyo3(get)]
    pub placement: String,
    /// Image pushed out of the count pool by this submission, if any.
    #[pyo3(get)]
    pub cascaded: Option<String>,
    /// Where the cascaded image went ("score" or "discarded").
    #[pyo3(get)]
    pub cascaded_placement: Option<String>,
    /// Image removed from the score pool, if any.
    #[pyo3(get)]
    pub dropped: Option<String>,
}

#[pymethods]
impl Outcome {
    fn __repr__(&self) -> String {
        format!(
            "Outcome(placement={:?}, cascaded={:?}, dropped={:?})",
            self.placement, self.cascaded, self.dropped
        )
    }
}

impl From<SubmitOutcome> for Outcome {
    fn from(o: SubmitOutcome) -> Self {
        let (cascaded, cascaded_placement) = match o.cascade {
            Some(c) => (Some(c.image_id), Some(placement_name(c.placement).to_owned())),
            None => (None, None),
        };
        Self {
            placement: placement_name(o.placement).to_owned(),
            cascaded,
            cascaded_placement,
            dropped: o.dropped,
        }
    }
}

/// Calls a Python function `detector(image) -> list[tuple[str, float]]`.
struct CallableDetector<'py> {
    func: Bound<'py, PyAny>,
}

impl<'py> Detector for CallableDetector<'py> {
    type Image = Bound<'py, PyAny>;

    fn detect(&self, image: &Bound<'py, PyAny>) -> Result<Vec<Detection>, DetectorError> {
        let pairs: Vec<(String, f32)> = self.func.call1((image,))?.extract()?;
        Ok(pairs.into_iter().map(Detection::from).collect())
    }
}

/// Selects a fixed-size subset of images from detection results.
#[pyclass]
pub struct Selector {
    inner: RustSelector,
    detector: Option<Py<PyAny>>,
}

#[pymethods]
impl Selector {
    /// Create a new Selector.
    ///
    /// Args:
    ///     selected_labels: Labels counted for the selection
    ///     selection_size: Number of images to select
    ///     label_multipliers: Weights aligned with selected_labels (default: all 1.0)
    ///     detector: Optional callable mapping an image to (label, confidence) pairs
    #[new]
    #[pyo3(signature = (selected_labels, selection_size, label_multipliers=None, detector=None))]
    fn new(
        selected_labels: Vec<String>,
        selection_size: usize,
        label_multipliers: Option<Vec<f32>>,
        detector: Option<Py<PyAny>>,
    ) -> PyResult<Self> {
        let mut config = SelectorConfig::new(selected_labels, selection_size);
        if let Some(multipliers) = label_multipliers.filter(|m| !m.is_empty()) {
            config = config.with_multipliers(multipliers);
        }
        let inner = RustSelector::new(config).map_err(to_py_err)?;
        Ok(Self { inner, detector })
    }

    /// Clear both pools and start a new selection.
    #[pyo3(signature = (selection_size, label_multipliers=None))]
    fn reset(
        &mut self,
        selection_size: usize,
        label_multipliers: Option<Vec<f32>>,
    ) -> PyResult<()> {
        let multipliers = label_multipliers.filter(|m| !m.is_empty());
        self.inner
            .reset(selection_size, multipliers.as_deref())
            .map_err(to_py_err)
    }

    /// Submit detections computed elsewhere for one image.
    fn submit_detections(
        &mut self,
        image_id: String,
        detections: Vec<(String, f32)>,
    ) -> PyResult<Outcome> {
        let detections: Vec<Detection> = detections.into_iter().map(Detection::from).collect();
        self.inner
            .submit_detections(image_id, &detections)
            .map(Outcome::from)
            .map_err(to_py_err)
    }

    /// Run the configured detector on `image` and submit the result.
    fn submit_image<'py>(
        &mut self,
        py: Python<'py>,
        image: Bound<'py, PyAny>,
        image_id: String,
    ) -> PyResult<Outcome> {
        let func = self
            .detector
            .as_ref()
            .ok_or_else(|| PyValueError::new_err("Selector was created without a detector"))?
            .bind(py)
            .clone();
        let detector = CallableDetector { func };
        self.inner
            .submit_image(&detector, &image, image_id)
            .map(Outcome::from)
            .map_err(to_py_err)
    }

    /// Selected image ids; never-filled slots are None.
    fn get_selected(&self) -> Vec<Option<String>> {
        self.inner.get_selected()
    }

    /// Selected image ids without empty slots.
    fn selected_ids(&self) -> Vec<String> {
        self.inner.selected_ids()
    }

    #[getter]
    fn selection_size(&self) -> usize {
        self.inner.selection_size()
    }

    #[getter]
    fn count_capacity(&self) -> usize {
        self.inner.count_capacity()
    }

    #[getter]
    fn score_capacity(&self) -> usize {
        self.inner.score_capacity()
    }

    fn __repr__(&self) -> String {
        let stats = self.inner.stats();
        format!(
            "Selector(selection_size={}, submitted={}, selected={})",
            self.inner.selection_size(),
            stats.submitted,
            self.inner.selected_ids().len()
        )
    }
}

/// Python module for detection-driven image selection.
#[pymodule]
fn _detselect(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Outcome>()?;
    m.add_class::<Selector>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
