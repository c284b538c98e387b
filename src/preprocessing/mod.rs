//! Signal preprocessing
//!
//! Prepares a recording for the envelope algorithms:
//! - DC removal and peak normalization
//! - Region-of-interest cropping
//! - Optional zero-phase band-pass filtering

pub mod bandpass;
pub mod normalization;

use crate::config::PreprocessConfig;
use crate::error::DetectionError;
use crate::signal::Signal;

/// Normalized working copy of (a region of) a signal
#[derive(Debug, Clone)]
pub struct PreprocessedSignal {
    /// Zero-mean, unit-peak samples (band-passed when configured)
    pub samples: Vec<f64>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Start of the analyzed region in seconds (0 for the whole signal)
    pub roi_start: f64,
}

/// Run DC removal, normalization, region cropping and band-pass, in that order
///
/// # Errors
///
/// `DegenerateSignal` for an all-zero signal or a region outside the signal.
pub fn preprocess(
    signal: &Signal,
    config: &PreprocessConfig,
) -> Result<PreprocessedSignal, DetectionError> {
    let sample_rate = signal.sample_rate();
    let normalized = normalization::remove_dc_and_normalize(signal.samples())?;

    let (first, last, roi_start) =
        normalization::region_bounds(&config.region, normalized.len(), sample_rate)?;
    let cropped = &normalized[first..last];

    let samples = match &config.bandpass {
        Some(bandpass) => bandpass::filtfilt_bandpass(cropped, sample_rate, bandpass),
        None => cropped.to_vec(),
    };

    log::debug!(
        "Preprocessed {} of {} samples at {} Hz (roi_start={:.6}s)",
        samples.len(),
        normalized.len(),
        sample_rate,
        roi_start
    );

    Ok(PreprocessedSignal {
        samples,
        sample_rate,
        roi_start,
    })
}
