//! Detect, export, import and score as one trial
//!
//! An outer parameter search calls [`trial_objective`] once per candidate
//! configuration and minimizes the returned value. Each stage is also
//! callable on its own.

use crate::analysis::scoring::{score_labels, DetectionStats};
use crate::config::DetectorConfig;
use crate::detector::Detector;
use crate::error::DetectionError;
use crate::labels::text_format::{format_detected_labels, parse_labels};
use crate::labels::Label;
use crate::signal::Signal;

/// Labels as the scorer sees them after a detector-output file round trip
///
/// Times are rounded to the 6 decimals of the text format and indices are
/// recomputed at `sample_rate`.
pub fn round_trip_labels(labels: &[Label], sample_rate: f64) -> Result<Vec<Label>, DetectionError> {
    parse_labels(&format_detected_labels(labels), sample_rate)
}

/// Detect on `signal`, round-trip through the text format and score against `reference`
pub fn evaluate(
    signal: &Signal,
    config: &DetectorConfig,
    reference: &[Label],
) -> Result<DetectionStats, DetectionError> {
    let detector = Detector::new(config.clone())?;
    let detected = detector.detect(signal)?;
    let imported = round_trip_labels(&detected, signal.sample_rate() as f64)?;
    Ok(score_labels(reference, &imported))
}

/// `−F1` of one detector configuration, for minimizing optimizers
pub fn trial_objective(
    signal: &Signal,
    config: &DetectorConfig,
    reference: &[Label],
) -> Result<f64, DetectionError> {
    let stats = evaluate(signal, config, reference)?;
    log::debug!(
        "Trial {}: F1={:.4} (P={:.4}, R={:.4})",
        config.method(),
        stats.f1_score,
        stats.precision,
        stats.recall
    );
    Ok(-stats.f1_score)
}
