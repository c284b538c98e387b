//! Evaluation of detector output
//!
//! - Midpoint matching and precision/recall/F1 scoring
//! - Detect → export → import → score trials for parameter search

pub mod evaluation;
pub mod scoring;

pub use evaluation::{round_trip_labels, trial_objective};
pub use scoring::{score_label_files, score_labels, DetectionStats};
