//! Time-interval labels
//!
//! The [`Label`] type flows through every stage: it is produced by run
//! extraction, filtered by [`postprocess`], read and written by
//! [`text_format`] and compared by the scoring engine.

pub mod postprocess;
pub mod text_format;

use serde::{Deserialize, Serialize};

/// Category tag written for detector output
pub const DETECTED_LABEL: &str = "d";

/// A detected or annotated interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Interval start in seconds
    pub start_time: f64,

    /// Interval end in seconds (`>= start_time`)
    pub end_time: f64,

    /// Category tag (`"d"` for detector output)
    pub label: String,

    /// Advisory start frequency in Hz (0 for detector output)
    pub start_frequency: f64,

    /// Advisory end frequency in Hz (0 for detector output)
    pub end_frequency: f64,

    /// Native start index (sample or frame) of the stage that produced the label
    pub start_index: usize,

    /// Native stop index (inclusive)
    pub stop_index: usize,
}

impl Label {
    /// A detector label with the default tag and zero frequencies
    pub fn detected(start_time: f64, end_time: f64, start_index: usize, stop_index: usize) -> Self {
        Self {
            start_time,
            end_time,
            label: DETECTED_LABEL.to_string(),
            start_frequency: 0.0,
            end_frequency: 0.0,
            start_index,
            stop_index,
        }
    }

    /// A label with indices derived from its times at `sample_rate`
    pub fn from_times(start_time: f64, end_time: f64, sample_rate: f64) -> Self {
        Self::detected(
            start_time,
            end_time,
            time_to_index(start_time, sample_rate),
            time_to_index(end_time, sample_rate),
        )
    }

    /// Interval length in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Interval midpoint in seconds
    pub fn midpoint(&self) -> f64 {
        (self.start_time + self.end_time) / 2.0
    }

    /// Whether `time` lies inside the interval, bounds included
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// `round(time·fs)`, clamped at 0
pub fn time_to_index(time: f64, sample_rate: f64) -> usize {
    (time * sample_rate).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_defaults() {
        let label = Label::detected(0.5, 1.5, 500, 1500);
        assert_eq!(label.label, "d");
        assert_eq!(label.start_frequency, 0.0);
        assert_eq!(label.end_frequency, 0.0);
        assert!((label.duration() - 1.0).abs() < 1e-12);
        assert!((label.midpoint() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let label = Label::detected(1.0, 2.0, 0, 0);
        assert!(label.contains(1.0));
        assert!(label.contains(2.0));
        assert!(!label.contains(2.000001));
    }

    #[test]
    fn test_from_times_indices() {
        let label = Label::from_times(0.1234, 0.5, 250_000.0);
        assert_eq!(label.start_index, 30_850);
        assert_eq!(label.stop_index, 125_000);
    }
}
