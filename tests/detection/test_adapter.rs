// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detector output validation

use binsort_node::detection::{adapt, AdaptationError, RawDetection, RawDetections, Scoring};

use crate::common::{raw, raw_with_scores};

fn adapt_one(detection: RawDetection) -> Result<binsort_node::detection::DetectionSet, AdaptationError> {
    adapt(RawDetections {
        detections: vec![detection],
        class_names: vec!["apple".to_string(), "banana".to_string()].into(),
    })
}

#[test]
fn test_preserves_order_and_scoring() {
    let set = adapt(RawDetections {
        detections: vec![
            raw([0.0, 0.0, 5.0, 5.0], 1, 0.7),
            raw_with_scores([1.0, 1.0, 9.0, 9.0], 0, vec![0.8, 0.2]),
        ],
        class_names: vec!["apple".to_string(), "banana".to_string()].into(),
    })
    .unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.candidates()[0].class_id, 1);
    assert!(matches!(set.candidates()[0].scoring, Scoring::Scalar { .. }));
    assert!(matches!(
        set.candidates()[1].scoring,
        Scoring::Distribution { .. }
    ));
    assert_eq!(set.label(0), Some("apple"));
}

#[test]
fn test_rejects_malformed_detections() {
    assert!(matches!(
        adapt_one(raw([f32::NAN, 0.0, 1.0, 1.0], 0, 0.5)),
        Err(AdaptationError::NonFiniteBox { .. })
    ));
    assert!(matches!(
        adapt_one(raw([5.0, 0.0, 5.0, 1.0], 0, 0.5)),
        Err(AdaptationError::InvertedBox { .. })
    ));
    assert!(matches!(
        adapt_one(raw([0.0, 0.0, 1.0, 1.0], 2, 0.5)),
        Err(AdaptationError::ClassOutOfRange { .. })
    ));
    assert!(matches!(
        adapt_one(raw([0.0, 0.0, 1.0, 1.0], -1, 0.5)),
        Err(AdaptationError::ClassOutOfRange { .. })
    ));
    assert!(matches!(
        adapt_one(raw([0.0, 0.0, 1.0, 1.0], 0, 1.5)),
        Err(AdaptationError::InvalidConfidence { .. })
    ));
    assert!(matches!(
        adapt_one(raw_with_scores([0.0, 0.0, 1.0, 1.0], 0, vec![0.5, 0.3, 0.2])),
        Err(AdaptationError::DistributionLength { expected: 2, actual: 3, .. })
    ));
}

#[test]
fn test_empty_output_is_valid() {
    let set = adapt(RawDetections {
        detections: vec![],
        class_names: vec![].into(),
    })
    .unwrap();
    assert!(set.is_empty());
}
