// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Main-object selection through the public API

use binsort_node::detection::{adapt, select_main, DetectionSet, RawDetections};

use crate::common::raw;

fn set(detections: Vec<binsort_node::detection::RawDetection>) -> DetectionSet {
    adapt(RawDetections {
        detections,
        class_names: vec!["apple".to_string(), "banana".to_string(), "cup".to_string()].into(),
    })
    .unwrap()
}

#[test]
fn test_largest_area_wins_over_confidence() {
    let set = set(vec![
        raw([0.0, 0.0, 10.0, 10.0], 0, 0.99),
        raw([0.0, 0.0, 20.0, 20.0], 1, 0.30),
    ]);

    let main = select_main(&set).unwrap();
    assert_eq!(main.index, 1);
    assert_eq!(main.label, "banana");
    assert!((main.confidence() - 0.30).abs() < 1e-6);
}

#[test]
fn test_equal_areas_keep_first() {
    let set = set(vec![
        raw([0.0, 0.0, 4.0, 25.0], 2, 0.5),
        raw([50.0, 50.0, 60.0, 60.0], 0, 0.5),
        raw([0.0, 0.0, 20.0, 5.0], 1, 0.5),
    ]);

    let main = select_main(&set).unwrap();
    assert_eq!(main.index, 0);
    assert_eq!(main.label, "cup");
}

#[test]
fn test_empty_set_has_no_main_object() {
    assert!(select_main(&set(vec![])).is_none());
}

#[test]
fn test_single_candidate_is_main() {
    let set = set(vec![raw([3.0, 4.0, 5.0, 6.0], 2, 0.42)]);
    let main = select_main(&set).unwrap();
    assert_eq!(main.index, 0);
    assert_eq!(main.candidate, &set.candidates()[0]);
}
