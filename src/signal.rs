//! Input waveform

use crate::error::DetectionError;

/// Mono recording handed to a detector
///
/// The samples are never modified by the pipeline; preprocessing works on
/// its own normalized copy.
#[derive(Debug, Clone)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Signal {
    /// Wrap samples recorded at `sample_rate` Hz
    ///
    /// # Errors
    ///
    /// `DegenerateSignal` for an empty sample vector, `InvalidConfig` for a zero sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, DetectionError> {
        if samples.is_empty() {
            return Err(DetectionError::DegenerateSignal(
                "Empty audio samples".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(DetectionError::InvalidConfig(
                "Sample rate must be > 0".to_string(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Raw samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sampling rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Convert a duration in seconds to a whole number of samples (rounded)
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    (seconds * sample_rate as f64).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signal_rejected() {
        let result = Signal::new(vec![], 44100);
        assert!(matches!(result, Err(DetectionError::DegenerateSignal(_))));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let result = Signal::new(vec![0.1; 10], 0);
        assert!(matches!(result, Err(DetectionError::InvalidConfig(_))));
    }

    #[test]
    fn test_duration() {
        let signal = Signal::new(vec![0.0; 250_000], 250_000).unwrap();
        assert!((signal.duration_seconds() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_to_samples_rounds() {
        assert_eq!(seconds_to_samples(0.0021, 1000), 2);
        assert_eq!(seconds_to_samples(0.0025, 1000), 3);
        assert_eq!(seconds_to_samples(0.004, 250_000), 1000);
    }
}
