//! Feature extraction modules
//!
//! - Change-score envelopes (RBD, BSCD, PSD)
//! - Thresholding and run segmentation
//! - Shared moving-window smoothing

pub mod envelope;
pub mod segmentation;
pub mod smoothing;
