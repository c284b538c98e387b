//! Detection pipeline
//!
//! ```text
//! Signal → preprocess → envelope → threshold mask → runs → labels
//!        → merge close → remove short → variant rejection → Vec<Label>
//! ```

use crate::config::DetectorConfig;
use crate::error::DetectionError;
use crate::features::envelope::{algorithm_for, EnvelopeAlgorithm};
use crate::features::segmentation::{extract_runs, runs_to_labels};
use crate::labels::postprocess::{merge_close_labels, remove_short_labels};
use crate::labels::Label;
use crate::preprocessing::preprocess;
use crate::signal::Signal;

/// A validated detector ready to run on any number of signals
///
/// `Detector` is immutable and `Send + Sync`; one instance can serve
/// concurrent calls.
pub struct Detector {
    config: DetectorConfig,
    algorithm: Box<dyn EnvelopeAlgorithm>,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("method", &self.algorithm.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Detector {
    /// Validate `config` and select its envelope algorithm
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when a parameter is out of range.
    pub fn new(config: DetectorConfig) -> Result<Self, DetectionError> {
        config.validate()?;
        let algorithm = algorithm_for(&config);
        Ok(Self { config, algorithm })
    }

    /// Configuration in force
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect vocalization intervals in `signal`
    ///
    /// Label times are absolute (region offset added) and sorted.
    ///
    /// # Errors
    ///
    /// `DegenerateSignal` for an all-zero signal or a region outside it;
    /// `InvalidConfig` for parameters that do not fit the signal's sample rate.
    pub fn detect(&self, signal: &Signal) -> Result<Vec<Label>, DetectionError> {
        let prepared = preprocess(signal, self.config.preprocess())?;
        let envelope = self.algorithm.compute_envelope(&prepared)?;
        let mask = self.algorithm.threshold_mask(&envelope);

        let runs = extract_runs(&mask);
        let raw = runs_to_labels(&runs, &envelope.axis, prepared.roi_start);

        let post = self.config.post();
        let merged = merge_close_labels(raw, post.max_gap);
        let merged_count = merged.len();
        let long_enough = remove_short_labels(merged, post.min_duration);
        let long_count = long_enough.len();
        let labels = self.algorithm.reject_labels(long_enough, &envelope);

        log::debug!(
            "{}: envelope {} values, {} runs, {} merged, {} long enough, {} kept",
            self.algorithm.name(),
            envelope.values.len(),
            runs.len(),
            merged_count,
            long_count,
            labels.len()
        );

        Ok(labels)
    }
}

/// Detect intervals in raw samples with a one-off detector
///
/// # Example
///
/// ```no_run
/// use usv_detect::{detect_labels, DetectorConfig};
///
/// let samples = vec![0.0f32; 250_000];
/// let labels = detect_labels(&samples, 250_000, &DetectorConfig::default())?;
/// # Ok::<(), usv_detect::DetectionError>(())
/// ```
pub fn detect_labels(
    samples: &[f32],
    sample_rate: u32,
    config: &DetectorConfig,
) -> Result<Vec<Label>, DetectionError> {
    let signal = Signal::new(samples.to_vec(), sample_rate)?;
    Detector::new(config.clone())?.detect(&signal)
}
