//! Recursive change score from autoregressive model evidence
//!
//! A window of `W = round(wlen·fs)` samples slides over the signal. At each
//! centre three autoregressive models are fit with Levinson-Durbin: one on
//! the left half, one on the right half and a shared one on the whole window.
//! The score is how much more evidence the two separate models have than the
//! shared one:
//!
//! ```text
//! E(m, p, σ²) = -(m/2)·ln σ² - ((p+1)/2)·ln m
//! score(c)    = max(0, E_left + E_right - E_joint)
//! ```
//!
//! A large score marks a regime change, i.e. a vocalization onset, offset or
//! a fast spectral change inside a call. Scores are held over the stride
//! around each centre and peak-normalized over the whole signal.
//!
//! Window fits are independent, so they run on the `rayon` pool; the result
//! does not depend on scheduling.

use rayon::prelude::*;

use super::{Envelope, EnvelopeAlgorithm, TimeAxis};
use crate::config::RbdConfig;
use crate::error::DetectionError;
use crate::features::segmentation::threshold::dynamic_threshold_mask;
use crate::features::smoothing::{peak_normalize_in_place, EPSILON};
use crate::preprocessing::PreprocessedSignal;
use crate::signal::seconds_to_samples;

/// Autoregressive change-score detector
#[derive(Debug, Clone)]
pub struct Rbd {
    config: RbdConfig,
}

impl Rbd {
    /// Create the detector strategy for a validated configuration
    pub fn new(config: RbdConfig) -> Self {
        Self { config }
    }
}

/// Biased autocorrelation `r[0..=order]` of a segment
fn autocorrelation(segment: &[f64], order: usize) -> Vec<f64> {
    let m = segment.len();
    (0..=order)
        .map(|lag| {
            if lag >= m {
                return 0.0;
            }
            let sum: f64 = segment[..m - lag]
                .iter()
                .zip(&segment[lag..])
                .map(|(a, b)| a * b)
                .sum();
            sum / m as f64
        })
        .collect()
}

/// Prediction-error variance of the order-`order` Levinson-Durbin fit
fn prediction_error(r: &[f64], order: usize) -> f64 {
    let mut err = r[0];
    if err <= EPSILON {
        return EPSILON;
    }

    let mut a = vec![0.0f64; order + 1];
    let mut prev = vec![0.0f64; order + 1];
    a[0] = 1.0;

    for i in 1..=order {
        let mut acc = r[i];
        for j in 1..i {
            acc += a[j] * r[i - j];
        }
        let k = -acc / err;

        prev.copy_from_slice(&a);
        for j in 1..i {
            a[j] = prev[j] + k * prev[i - j];
        }
        a[i] = k;

        err *= 1.0 - k * k;
        if err <= EPSILON {
            return EPSILON;
        }
    }

    err
}

/// Log-evidence of an order-`order` autoregressive fit on `segment`
pub fn log_evidence(segment: &[f64], order: usize) -> f64 {
    let m = segment.len() as f64;
    let r = autocorrelation(segment, order);
    let err = prediction_error(&r, order);
    -(m / 2.0) * (err + EPSILON).ln() - ((order + 1) as f64 / 2.0) * m.ln()
}

/// Change score per sample (not yet normalized)
///
/// # Errors
///
/// `InvalidConfig` when the half window is too short for the model orders at
/// this sample rate.
pub fn change_score(
    samples: &[f64],
    sample_rate: u32,
    config: &RbdConfig,
) -> Result<Vec<f64>, DetectionError> {
    let window = seconds_to_samples(config.wlen, sample_rate);
    let half = window / 2;
    let stride = seconds_to_samples(config.step, sample_rate).max(1);
    let max_side_order = config.left_order.max(config.right_order);

    if half <= max_side_order + 1 || 2 * half <= config.evidence_order + 1 {
        return Err(DetectionError::InvalidConfig(format!(
            "wlen {:.6}s gives a half window of {} samples at {} Hz, too short for AR orders {}/{}/{}",
            config.wlen,
            half,
            sample_rate,
            config.left_order,
            config.right_order,
            config.evidence_order
        )));
    }

    let n = samples.len();
    let mut score = vec![0.0f64; n];
    if n < 2 * half {
        log::warn!(
            "Signal of {} samples shorter than the {}-sample RBD window, score is zero",
            n,
            2 * half
        );
        return Ok(score);
    }

    let centres: Vec<usize> = (half..=n - half).step_by(stride).collect();

    log::debug!(
        "RBD: {} windows of {} samples (stride {}), orders {}/{}/{}",
        centres.len(),
        2 * half,
        stride,
        config.left_order,
        config.right_order,
        config.evidence_order
    );

    let values: Vec<f64> = centres
        .par_iter()
        .map(|&c| {
            let left = log_evidence(&samples[c - half..c], config.left_order);
            let right = log_evidence(&samples[c..c + half], config.right_order);
            let joint = log_evidence(&samples[c - half..c + half], config.evidence_order);
            (left + right - joint).max(0.0)
        })
        .collect();

    for (&c, &value) in centres.iter().zip(&values) {
        let lo = c.saturating_sub(stride / 2);
        let hi = (c + stride.div_ceil(2)).min(n);
        for s in &mut score[lo..hi] {
            *s = value;
        }
    }

    Ok(score)
}

impl EnvelopeAlgorithm for Rbd {
    fn name(&self) -> &'static str {
        "rbd"
    }

    fn compute_envelope(&self, signal: &PreprocessedSignal) -> Result<Envelope, DetectionError> {
        let mut values = change_score(&signal.samples, signal.sample_rate, &self.config)?;
        peak_normalize_in_place(&mut values);

        Ok(Envelope {
            values,
            axis: TimeAxis::samples(signal.sample_rate),
            noise_floor: None,
        })
    }

    fn threshold_mask(&self, envelope: &Envelope) -> Vec<bool> {
        let fs = envelope.axis.sample_rate;
        dynamic_threshold_mask(
            &envelope.values,
            seconds_to_samples(self.config.smoothing_window_rbd, fs).max(1),
            seconds_to_samples(self.config.smoothing_window_thr, fs).max(1),
            self.config.dynamic_scaling,
            self.config.amplitude_threshold,
        )
    }
}
