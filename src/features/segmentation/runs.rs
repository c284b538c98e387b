//! Contiguous-run extraction from a binary mask

use crate::features::envelope::TimeAxis;
use crate::labels::Label;

/// Inclusive `(start, end)` index pairs of every run of `true` values
///
/// The mask is padded with `false` on both sides before differencing, so a
/// run touching either boundary is reported like any other: a `+1` step opens
/// a run at its index, a `-1` step closes it one index earlier.
pub fn extract_runs(mask: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    let mut prev = false;

    for i in 0..=mask.len() {
        let current = mask.get(i).copied().unwrap_or(false);
        match (prev, current) {
            (false, true) => start = i,
            (true, false) => runs.push((start, i - 1)),
            _ => {}
        }
        prev = current;
    }

    runs
}

/// Convert runs to detector labels on a time axis, shifted by the region start
pub fn runs_to_labels(runs: &[(usize, usize)], axis: &TimeAxis, roi_start: f64) -> Vec<Label> {
    runs.iter()
        .map(|&(start, end)| {
            Label::detected(
                axis.seconds(start) + roi_start,
                axis.seconds(end) + roi_start,
                start,
                end,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(bits: &[u8]) -> Vec<bool> {
        bits.iter().map(|&b| b == 1).collect()
    }

    #[test]
    fn test_interior_runs() {
        assert_eq!(extract_runs(&mask(&[0, 1, 1, 0, 1, 0])), vec![(1, 2), (4, 4)]);
    }

    #[test]
    fn test_run_at_start() {
        assert_eq!(extract_runs(&mask(&[1, 0])), vec![(0, 0)]);
    }

    #[test]
    fn test_run_at_end() {
        assert_eq!(extract_runs(&mask(&[0, 0, 1, 1])), vec![(2, 3)]);
    }

    #[test]
    fn test_all_on_and_all_off() {
        assert_eq!(extract_runs(&mask(&[1, 1, 1])), vec![(0, 2)]);
        assert!(extract_runs(&mask(&[0, 0, 0])).is_empty());
        assert!(extract_runs(&[]).is_empty());
    }

    #[test]
    fn test_labels_use_axis_and_roi() {
        let axis = TimeAxis::samples(1000);
        let labels = runs_to_labels(&[(100, 199)], &axis, 2.0);
        assert_eq!(labels.len(), 1);
        assert!((labels[0].start_time - 2.1).abs() < 1e-12);
        assert!((labels[0].end_time - 2.199).abs() < 1e-12);
        assert_eq!(labels[0].start_index, 100);
        assert_eq!(labels[0].stop_index, 199);
        assert_eq!(labels[0].label, "d");
    }
}
