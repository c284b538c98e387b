//! Midpoint matching and detection scoring
//!
//! A provided (reference) label is found when a detected label contains its
//! midpoint. Matching is greedy and one-to-one:
//!
//! 1. Walk provided labels in their given order
//! 2. Match each to the **first** not-yet-matched detected label (input
//!    order) whose closed interval contains its midpoint (true positive)
//! 3. No such label: false negative
//! 4. Detected labels never matched: false positives
//!
//! The assignment is order-dependent, not a maximum bipartite matching, so
//! historical scores stay reproducible.
//!
//! # Example
//!
//! ```
//! use usv_detect::analysis::scoring::score_labels;
//! use usv_detect::labels::Label;
//!
//! let provided = vec![Label::detected(0.0, 2.0, 0, 0)];
//! let detected = vec![Label::detected(0.5, 1.5, 0, 0), Label::detected(3.0, 4.0, 0, 0)];
//! let stats = score_labels(&provided, &detected);
//!
//! assert_eq!((stats.true_positives, stats.false_positives), (1, 1));
//! assert_eq!(stats.precision, 0.5);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;
use crate::features::smoothing::EPSILON;
use crate::labels::text_format::read_labels;
use crate::labels::Label;

/// Counts and rates from one scoring pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    /// Number of provided (reference) labels
    pub total_provided: usize,

    /// Number of detected labels
    pub total_detected: usize,

    /// Provided labels matched by a detection
    pub true_positives: usize,

    /// Detected labels matching no provided label
    pub false_positives: usize,

    /// Provided labels without a matching detection
    pub false_negatives: usize,

    /// `TP / max(TP + FP, 1)`
    pub precision: f64,

    /// `TP / max(TP + FN, 1)`
    pub recall: f64,

    /// `2PR / max(P + R, ε)`
    pub f1_score: f64,
}

impl DetectionStats {
    /// Derive the totals and rates from the three counts
    ///
    /// Every provided label is either a TP or an FN, and every detected label
    /// either a TP or an FP.
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        let tp = true_positives as f64;
        let precision = tp / (true_positives + false_positives).max(1) as f64;
        let recall = tp / (true_positives + false_negatives).max(1) as f64;
        let f1_score = 2.0 * precision * recall / (precision + recall).max(EPSILON);

        Self {
            total_provided: true_positives + false_negatives,
            total_detected: true_positives + false_positives,
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1_score,
        }
    }
}

/// Score detected labels against provided (reference) labels
pub fn score_labels(provided: &[Label], detected: &[Label]) -> DetectionStats {
    let mut matched = vec![false; detected.len()];
    let mut true_positives = 0;
    let mut false_negatives = 0;

    for reference in provided {
        let mid = reference.midpoint();
        let hit = detected
            .iter()
            .enumerate()
            .find(|(i, d)| !matched[*i] && d.contains(mid))
            .map(|(i, _)| i);

        match hit {
            Some(i) => {
                matched[i] = true;
                true_positives += 1;
            }
            None => false_negatives += 1,
        }
    }

    let false_positives = matched.iter().filter(|&&m| !m).count();
    let stats = DetectionStats::from_counts(true_positives, false_positives, false_negatives);
    debug_assert_eq!(stats.total_provided, provided.len());
    debug_assert_eq!(stats.total_detected, detected.len());

    log::debug!(
        "Scored {} provided vs {} detected: TP={} FP={} FN={} F1={:.4}",
        provided.len(),
        detected.len(),
        stats.true_positives,
        stats.false_positives,
        stats.false_negatives,
        stats.f1_score
    );

    stats
}

/// Read two label files at `sample_rate` and score them
pub fn score_label_files(
    provided_path: impl AsRef<Path>,
    detected_path: impl AsRef<Path>,
    sample_rate: f64,
) -> Result<DetectionStats, DetectionError> {
    let provided = read_labels(provided_path, sample_rate)?;
    let detected = read_labels(detected_path, sample_rate)?;
    Ok(score_labels(&provided, &detected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(start: f64, end: f64) -> Label {
        Label::from_times(start, end, 1000.0)
    }

    #[test]
    fn test_midpoint_example() {
        let provided = vec![label(0.0, 2.0)];
        let detected = vec![label(0.5, 1.5), label(3.0, 4.0)];
        let stats = score_labels(&provided, &detected);

        assert_eq!(stats.true_positives, 1);
        assert_eq!(stats.false_positives, 1);
        assert_eq!(stats.false_negatives, 0);
        assert_eq!(stats.precision, 0.5);
        assert_eq!(stats.recall, 1.0);
        assert!((stats.f1_score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_totals_match_counts() {
        let provided = vec![label(0.0, 1.0), label(2.0, 3.0), label(5.0, 6.0)];
        let detected = vec![label(0.2, 0.8), label(3.5, 4.0)];
        let stats = score_labels(&provided, &detected);

        assert_eq!(stats.total_provided, 3);
        assert_eq!(stats.total_detected, 2);
        assert_eq!(stats.total_provided, stats.true_positives + stats.false_negatives);
        assert_eq!(stats.total_detected, stats.true_positives + stats.false_positives);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_provided"], 3);
        assert_eq!(json["total_detected"], 2);
    }

    #[test]
    fn test_empty_inputs() {
        let stats = score_labels(&[], &[]);
        assert_eq!(stats, DetectionStats::from_counts(0, 0, 0));
        assert_eq!(stats.precision, 0.0);
        assert_eq!(stats.recall, 0.0);
        assert_eq!(stats.f1_score, 0.0);
    }

    #[test]
    fn test_nothing_detected() {
        let stats = score_labels(&[label(0.0, 1.0), label(2.0, 3.0)], &[]);
        assert_eq!(stats.false_negatives, 2);
        assert_eq!(stats.recall, 0.0);
        assert_eq!(stats.f1_score, 0.0);
    }

    #[test]
    fn test_perfect_detection() {
        let labels = vec![label(0.0, 1.0), label(2.0, 3.0)];
        let stats = score_labels(&labels, &labels);
        assert_eq!(stats.true_positives, 2);
        assert_eq!(stats.f1_score, 1.0);
    }

    #[test]
    fn test_midpoint_on_boundary_matches() {
        // midpoint 1.0 equals the detected end time
        let stats = score_labels(&[label(0.5, 1.5)], &[label(0.0, 1.0)]);
        assert_eq!(stats.true_positives, 1);
    }

    #[test]
    fn test_one_detection_matches_once() {
        let provided = vec![label(0.0, 1.0), label(0.2, 0.8)];
        let detected = vec![label(0.0, 1.0)];
        let stats = score_labels(&provided, &detected);
        assert_eq!(stats.true_positives, 1);
        assert_eq!(stats.false_negatives, 1);
        assert_eq!(stats.false_positives, 0);
    }

    #[test]
    fn test_greedy_matching_is_order_dependent() {
        // A's midpoint (0.5) lies in both detections, B's (0.9) only in the first
        let a = label(0.0, 1.0);
        let b = label(0.8, 1.0);
        let detected = vec![label(0.4, 1.0), label(0.45, 0.55)];

        let in_order = score_labels(&[a.clone(), b.clone()], &detected);
        assert_eq!(in_order.true_positives, 1);
        assert_eq!(in_order.false_negatives, 1);

        let reversed = score_labels(&[b, a], &detected);
        assert_eq!(reversed.true_positives, 2);
        assert_eq!(reversed.false_negatives, 0);
    }

    #[test]
    fn test_score_label_files() {
        let dir = tempfile::tempdir().unwrap();
        let provided = dir.path().join("provided.txt");
        let detected = dir.path().join("detected.txt");
        crate::labels::text_format::write_labels(&provided, &[label(0.0, 2.0)]).unwrap();
        crate::labels::text_format::write_detected_labels(
            &detected,
            &[label(0.5, 1.5), label(3.0, 4.0)],
        )
        .unwrap();

        let stats = score_label_files(&provided, &detected, 1000.0).unwrap();
        assert_eq!(stats.true_positives, 1);
        assert_eq!(stats.false_positives, 1);
    }
}
