// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Main-object selection

use super::{Candidate, DetectionSet};

/// The candidate chosen as the primary detection, borrowed from its set
#[derive(Debug, Clone, Copy)]
pub struct MainObject<'a> {
    /// Position of the candidate within the set
    pub index: usize,
    pub candidate: &'a Candidate,
    /// Resolved class label
    pub label: &'a str,
    /// Class table of the set the candidate came from
    pub class_names: &'a [String],
}

impl MainObject<'_> {
    pub fn confidence(&self) -> f32 {
        self.candidate.confidence()
    }
}

/// Pick the candidate with the largest box area
///
/// Single greedy scan: a later candidate replaces the current best only when
/// its area is strictly greater, so the earliest candidate wins ties.
/// Overlapping boxes are not merged or suppressed here.
pub fn select_main(set: &DetectionSet) -> Option<MainObject<'_>> {
    let mut best: Option<(usize, &Candidate, f32)> = None;

    for (index, candidate) in set.candidates().iter().enumerate() {
        let area = candidate.area();
        match best {
            Some((_, _, best_area)) if area <= best_area => {}
            _ => best = Some((index, candidate, area)),
        }
    }

    let (index, candidate, _) = best?;
    let label = set.label(candidate.class_id)?;

    Some(MainObject {
        index,
        candidate,
        label,
        class_names: set.class_names(),
    })
}
