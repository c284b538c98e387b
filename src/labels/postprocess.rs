//! Label post-processing filters
//!
//! Filters compose; when both are used, merge before removing short labels,
//! since merging can join sub-threshold fragments into one acceptable call.

use super::Label;

/// Merge labels separated by a gap strictly shorter than `max_gap`
///
/// Scans left to right on a sorted sequence. A merged label keeps its start
/// and takes the end time and stop index of the label it absorbs.
pub fn merge_close_labels(labels: Vec<Label>, max_gap: f64) -> Vec<Label> {
    let mut iter = labels.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        if next.start_time - current.end_time < max_gap {
            current.end_time = next.end_time;
            current.stop_index = next.stop_index;
        } else {
            merged.push(std::mem::replace(&mut current, next));
        }
    }
    merged.push(current);
    merged
}

/// Drop labels shorter than `min_duration` seconds, preserving order
pub fn remove_short_labels(labels: Vec<Label>, min_duration: f64) -> Vec<Label> {
    labels
        .into_iter()
        .filter(|label| label.duration() >= min_duration)
        .collect()
}

/// Drop labels whose mean effective power over their index range is below `min_power`
///
/// Indices are native to `effective` (frames for the spectral detector) and
/// are clipped to its length; a label entirely outside it is dropped.
pub fn remove_low_power_labels(labels: Vec<Label>, effective: &[f64], min_power: f64) -> Vec<Label> {
    labels
        .into_iter()
        .filter(|label| {
            let start = label.start_index.min(effective.len());
            let end = (label.stop_index + 1).min(effective.len());
            if start >= end {
                return false;
            }
            let span = &effective[start..end];
            let mean = span.iter().sum::<f64>() / span.len() as f64;
            mean >= min_power
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(start: f64, end: f64) -> Label {
        Label::from_times(start, end, 1000.0)
    }

    fn total_duration(labels: &[Label]) -> f64 {
        labels.iter().map(Label::duration).sum()
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_close_labels(Vec::new(), 0.1).is_empty());
    }

    #[test]
    fn test_merge_close_gap() {
        let labels = vec![label(0.0, 1.0), label(1.05, 2.0), label(3.0, 4.0)];
        let merged = merge_close_labels(labels, 0.1);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start_time, 0.0);
        assert_eq!(merged[0].end_time, 2.0);
        assert_eq!(merged[0].stop_index, 2000);
        assert_eq!(merged[1].start_time, 3.0);
    }

    #[test]
    fn test_merge_chain() {
        let labels = vec![label(0.0, 0.1), label(0.15, 0.2), label(0.25, 0.3)];
        let merged = merge_close_labels(labels, 0.06);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].end_time, 0.3);
    }

    #[test]
    fn test_merge_gap_equal_is_kept_apart() {
        let labels = vec![label(0.0, 1.0), label(1.5, 2.0)];
        assert_eq!(merge_close_labels(labels, 0.5).len(), 2);
    }

    #[test]
    fn test_merge_zero_gap_is_identity() {
        let labels = vec![label(0.0, 1.0), label(1.0, 2.0), label(2.5, 3.0)];
        assert_eq!(merge_close_labels(labels.clone(), 0.0), labels);
    }

    #[test]
    fn test_merge_count_and_coverage() {
        let labels = vec![
            label(0.0, 0.1),
            label(0.12, 0.2),
            label(0.5, 0.6),
            label(0.61, 0.7),
            label(1.0, 1.1),
        ];
        let merged = merge_close_labels(labels.clone(), 0.05);
        assert!(merged.len() <= labels.len());
        // coverage only grows, by at most the merged gaps (0.02 + 0.01)
        let before = total_duration(&labels);
        let after = total_duration(&merged);
        assert!(after >= before - 1e-12);
        assert!(after <= before + 0.03 + 1e-12);
    }

    #[test]
    fn test_remove_short() {
        let labels = vec![label(0.0, 0.004), label(1.0, 1.01), label(2.0, 2.006)];
        let kept = remove_short_labels(labels, 0.005);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].start_time, 1.0);
        assert_eq!(kept[1].start_time, 2.0);
        assert!(kept.iter().all(|l| l.duration() >= 0.005));
    }

    #[test]
    fn test_remove_short_idempotent() {
        let labels = vec![label(0.0, 0.3), label(1.0, 1.05), label(2.0, 2.2)];
        let once = remove_short_labels(labels, 0.1);
        let twice = remove_short_labels(once.clone(), 0.1);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_before_remove_keeps_fragments() {
        let labels = vec![label(0.0, 0.003), label(0.004, 0.007)];
        let merged_first = remove_short_labels(merge_close_labels(labels.clone(), 0.002), 0.005);
        let removed_first = merge_close_labels(remove_short_labels(labels, 0.005), 0.002);
        assert_eq!(merged_first.len(), 1);
        assert!(removed_first.is_empty());
    }

    #[test]
    fn test_remove_low_power() {
        let effective = vec![0.0, 0.0, 0.5, 0.5, 0.0, 0.001, 0.001, 0.0];
        let labels = vec![
            Label::detected(0.0, 0.0, 2, 3),
            Label::detected(0.0, 0.0, 5, 6),
            Label::detected(0.0, 0.0, 20, 25),
        ];
        let kept = remove_low_power_labels(labels, &effective, 0.01);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start_index, 2);
    }
}
