use detselect::lowlevel::Slot;
use detselect::{
    Detection, Detector, DetectorError, ImageMetrics, Placement, SelectError, Selector,
    SelectorConfig,
};
use std::collections::HashMap;

/// Detector backed by a lookup table keyed by image name.
struct TableDetector {
    table: HashMap<&'static str, Vec<Detection>>,
}

impl TableDetector {
    fn new(entries: Vec<(&'static str, Vec<Detection>)>) -> Self {
        Self {
            table: entries.into_iter().collect(),
        }
    }
}

fn dets(items: &[(&str, f32)]) -> Vec<Detection> {
    items.iter().map(|&(l, c)| Detection::new(l, c)).collect()
}

impl Detector for TableDetector {
    type Image = str;

    fn detect(&self, image: &str) -> Result<Vec<Detection>, DetectorError> {
        self.table
            .get(image)
            .cloned()
            .ok_or_else(|| format!("no detections recorded for {image}").into())
    }
}

fn cat_dog_selector(size: usize) -> Selector {
    Selector::new(SelectorConfig::new(["cat", "dog"], size)).unwrap()
}

fn metrics(weighted_count: f32, average_score: f32) -> ImageMetrics {
    ImageMetrics {
        weighted_count,
        average_score,
    }
}

#[test]
fn cat_dog_scenario_selects_expected_images() {
    let detector = TableDetector::new(vec![
        ("A", dets(&[("cat", 0.9)])),
        ("B", dets(&[("cat", 0.9), ("dog", 0.8)])),
        ("C", dets(&[])),
    ]);
    let mut sel = cat_dog_selector(4);
    assert_eq!(sel.count_capacity(), 2);
    assert_eq!(sel.score_capacity(), 2);

    let a = sel.submit_image(&detector, "A", "A").unwrap();
    assert_eq!(a.placement, Placement::CountPool);
    assert!(a.cascade.is_none());
    assert_eq!(sel.score_pool().occupied(), 0);

    let b = sel.submit_image(&detector, "B", "B").unwrap();
    assert_eq!(b.placement, Placement::CountPool);
    assert!(b.cascade.is_none());
    assert_eq!(sel.count_pool().lowest_index(), 0);
    assert!((sel.count_pool().lowest_count() - 1.0).abs() < 1e-6);
    let b_entry = sel.count_pool().slots()[1].as_filled().unwrap();
    assert!((b_entry.weighted_count - 2.0).abs() < 1e-6);
    assert!((b_entry.average_score - 0.85).abs() < 1e-6);

    let c = sel.submit_image(&detector, "C", "C").unwrap();
    assert_eq!(c.placement, Placement::ScorePool);
    let c_entry = sel.score_pool().slots()[0].as_filled().unwrap();
    assert_eq!(c_entry.image_id, "C");
    assert!((c_entry.average_score - 1.0).abs() < 1e-6);
    assert!(sel.score_pool().slots()[1].is_empty());

    assert_eq!(
        sel.get_selected(),
        vec![
            Some("A".to_string()),
            Some("B".to_string()),
            Some("C".to_string()),
            None,
        ]
    );
    assert_eq!(sel.selected_ids(), vec!["A", "B", "C"]);
}

#[test]
fn equal_count_never_evicts() {
    let mut sel = cat_dog_selector(2);
    sel.submit("a", metrics(2.0, 0.5));
    let outcome = sel.submit("b", metrics(2.0, 0.1));
    assert_eq!(outcome.placement, Placement::ScorePool);
    assert!(outcome.cascade.is_none());
    assert_eq!(
        sel.count_pool().slots()[0].as_filled().unwrap().image_id,
        "a"
    );
}

#[test]
fn displaced_image_not_new_one_reaches_score_pool() {
    let mut sel = cat_dog_selector(2);
    sel.submit("old", metrics(1.0, 0.95));
    // The newcomer has a very low score but only the displaced image is offered.
    let outcome = sel.submit("new", metrics(5.0, 0.01));
    assert_eq!(outcome.placement, Placement::CountPool);
    let cascade = outcome.cascade.unwrap();
    assert_eq!(cascade.image_id, "old");
    assert_eq!(cascade.placement, Placement::ScorePool);
    assert_eq!(sel.selected_ids(), vec!["new", "old"]);
}

#[test]
fn cascade_can_be_discarded() {
    let mut sel = cat_dog_selector(2);
    sel.submit("low", metrics(0.0, 0.1));
    sel.submit("first", metrics(1.0, 0.9));
    let outcome = sel.submit("second", metrics(2.0, 0.5));
    let cascade = outcome.cascade.unwrap();
    assert_eq!(cascade.image_id, "first");
    assert_eq!(cascade.placement, Placement::Discarded);
    assert_eq!(sel.selected_ids(), vec!["second", "low"]);
}

#[test]
fn single_slot_selection_has_no_score_pool() {
    let mut sel = cat_dog_selector(1);
    assert_eq!(sel.score_capacity(), 0);
    let outcome = sel.submit("a", metrics(0.0, 0.2));
    assert_eq!(outcome.placement, Placement::Discarded);
    assert_eq!(sel.get_selected(), vec![None]);
}

#[test]
fn multipliers_favor_rare_classes() {
    let cfg = SelectorConfig::new(["person", "bicycle"], 2).with_multipliers(vec![1.0, 5.0]);
    let mut sel = Selector::new(cfg).unwrap();
    let crowd: Vec<Detection> = (0..4).map(|_| Detection::new("person", 0.8)).collect();
    sel.submit_detections("crowd", &crowd).unwrap();
    let outcome = sel
        .submit_detections("bike", &[Detection::new("bicycle", 0.7)])
        .unwrap();
    assert_eq!(outcome.placement, Placement::CountPool);
    assert_eq!(outcome.cascade.unwrap().image_id, "crowd");
}

#[test]
fn detection_failure_skips_image() {
    let detector = TableDetector::new(vec![("A", dets(&[("cat", 0.9)]))]);
    let mut sel = cat_dog_selector(2);
    sel.submit_image(&detector, "A", "A").unwrap();
    let before = sel.get_selected();

    let err = sel.submit_image(&detector, "missing", "missing").unwrap_err();
    match err {
        SelectError::DetectionFailure { image_id, reason } => {
            assert_eq!(image_id, "missing");
            assert!(reason.contains("no detections recorded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(sel.get_selected(), before);
    assert_eq!(sel.stats().detection_failures, 1);
    assert_eq!(sel.stats().submitted, 1);
}

#[test]
fn reset_twice_yields_identical_empty_state() {
    let mut sel = cat_dog_selector(4);
    sel.submit("a", metrics(3.0, 0.4));
    sel.submit("b", metrics(0.0, 1.0));

    sel.reset(6, Some(&[2.0, 1.0])).unwrap();
    let first = (
        sel.get_selected(),
        sel.count_capacity(),
        sel.score_capacity(),
        sel.labels().clone(),
    );
    sel.reset(6, Some(&[2.0, 1.0])).unwrap();
    let second = (
        sel.get_selected(),
        sel.count_capacity(),
        sel.score_capacity(),
        sel.labels().clone(),
    );
    assert_eq!(first, second);
    assert!(first.0.iter().all(Option::is_none));
    assert!(sel.count_pool().slots().iter().all(Slot::is_empty));
    assert!(sel.score_pool().slots().iter().all(Slot::is_empty));
}

#[test]
fn reset_without_multipliers_restores_defaults() {
    let cfg = SelectorConfig::new(["cat", "dog"], 2).with_multipliers(vec![3.0, 2.0]);
    let mut sel = Selector::new(cfg).unwrap();
    sel.reset(2, None).unwrap();
    assert_eq!(sel.labels().multiplier("cat"), Some(1.0));
    assert_eq!(sel.labels().multiplier("dog"), Some(1.0));
}
