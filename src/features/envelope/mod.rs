//! Change-score envelope algorithms
//!
//! Three interchangeable strategies turn a preprocessed signal into a
//! non-negative envelope whose magnitude tracks the presence of a
//! vocalization:
//! - [`rbd::Rbd`]: autoregressive model-evidence change score (sample axis)
//! - [`bscd::Bscd`]: Bayesian sequential change statistic on power (sample axis)
//! - [`psd::Psd`]: band-limited spectrogram power (frame axis)
//!
//! Each strategy also owns its threshold policy and any label rejection that
//! needs the envelope, so the detector never branches on the variant.

pub mod bscd;
pub mod psd;
pub mod rbd;

use crate::config::DetectorConfig;
use crate::error::DetectionError;
use crate::labels::Label;
use crate::preprocessing::PreprocessedSignal;

/// Mapping from native envelope indices to seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    /// Samples between consecutive envelope indices
    pub hop: usize,
    /// Sample position of index 0
    pub offset: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl TimeAxis {
    /// One envelope value per sample
    pub fn samples(sample_rate: u32) -> Self {
        Self {
            hop: 1,
            offset: 0,
            sample_rate,
        }
    }

    /// One envelope value per STFT frame, located at the frame centre
    pub fn frames(hop: usize, segment_length: usize, sample_rate: u32) -> Self {
        Self {
            hop,
            offset: segment_length / 2,
            sample_rate,
        }
    }

    /// Time in seconds (relative to the analyzed region) of a native index
    pub fn seconds(&self, index: usize) -> f64 {
        (index * self.hop + self.offset) as f64 / self.sample_rate as f64
    }
}

/// Envelope on its native time axis
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Non-negative envelope values
    pub values: Vec<f64>,
    /// Index-to-time mapping
    pub axis: TimeAxis,
    /// Estimated noise floor on the same axis, when the algorithm tracks one
    pub noise_floor: Option<Vec<f64>>,
}

/// A change-score strategy with its own threshold and rejection policy
pub trait EnvelopeAlgorithm: Send + Sync {
    /// Short method name
    fn name(&self) -> &'static str;

    /// Compute the envelope of a preprocessed signal
    fn compute_envelope(&self, signal: &PreprocessedSignal) -> Result<Envelope, DetectionError>;

    /// Binarize the envelope (true = vocalization present)
    fn threshold_mask(&self, envelope: &Envelope) -> Vec<bool>;

    /// Drop labels that need envelope evidence to be rejected
    fn reject_labels(&self, labels: Vec<Label>, _envelope: &Envelope) -> Vec<Label> {
        labels
    }
}

/// Build the strategy selected by a configuration
pub fn algorithm_for(config: &DetectorConfig) -> Box<dyn EnvelopeAlgorithm> {
    match config {
        DetectorConfig::Rbd(c) => Box::new(rbd::Rbd::new(c.clone())),
        DetectorConfig::Bscd(c) => Box::new(bscd::Bscd::new(c.clone())),
        DetectorConfig::Psd(c) => Box::new(psd::Psd::new(c.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_axis() {
        let axis = TimeAxis::samples(1000);
        assert!((axis.seconds(250) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_frame_axis_uses_centre() {
        let axis = TimeAxis::frames(256, 512, 256_000);
        assert!((axis.seconds(0) - 0.001).abs() < 1e-12);
        assert!((axis.seconds(4) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_algorithm_names() {
        use crate::config::{BscdConfig, PsdConfig, RbdConfig};
        assert_eq!(algorithm_for(&DetectorConfig::Rbd(RbdConfig::default())).name(), "rbd");
        assert_eq!(algorithm_for(&DetectorConfig::Bscd(BscdConfig::default())).name(), "bscd");
        assert_eq!(algorithm_for(&DetectorConfig::Psd(PsdConfig::default())).name(), "psd");
    }
}
