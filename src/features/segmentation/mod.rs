//! Thresholding and segmentation
//!
//! Envelope → binary mask ([`threshold`]) → contiguous runs → labels ([`runs`]).

pub mod runs;
pub mod threshold;

pub use runs::{extract_runs, runs_to_labels};
