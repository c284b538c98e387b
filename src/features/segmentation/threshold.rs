//! Adaptive threshold policies
//!
//! One policy per envelope family:
//! - dynamic moving-average threshold plus a fixed amplitude floor (RBD)
//! - global mean (BSCD)
//! - local mean + k·std relaxed by local SNR (PSD)

use crate::features::smoothing::{mean, moving_average, moving_mean_std, EPSILON};

/// Upper clip on the local SNR used by [`local_snr_mask`]
pub const MAX_LOCAL_SNR: f64 = 10.0;

/// Two-gate dynamic threshold on a change score
///
/// The score is smoothed over `smoothing_window` samples; the dynamic
/// threshold is `dynamic_scaling` times its moving average over
/// `threshold_window` samples. A sample is on only when the smoothed score is
/// above both the dynamic threshold and `amplitude_threshold`.
pub fn dynamic_threshold_mask(
    score: &[f64],
    smoothing_window: usize,
    threshold_window: usize,
    dynamic_scaling: f64,
    amplitude_threshold: f64,
) -> Vec<bool> {
    let smoothed = moving_average(score, smoothing_window);
    let dynamic = moving_average(&smoothed, threshold_window);

    smoothed
        .iter()
        .zip(&dynamic)
        .map(|(&s, &d)| s > dynamic_scaling * d && s > amplitude_threshold)
        .collect()
}

/// Uniform threshold at the global mean of the envelope
pub fn global_mean_mask(envelope: &[f64]) -> Vec<bool> {
    let threshold = mean(envelope);
    log::debug!("Global mean threshold: {:.6}", threshold);
    envelope.iter().map(|&v| v > threshold).collect()
}

/// Local-statistics threshold relaxed by local SNR
///
/// `threshold = (local_mean + k_std·local_std) / (1 + snr_weight·snr)` with
/// `snr = min(effective / (noise_floor + ε), 10)`.
pub fn local_snr_mask(
    effective: &[f64],
    noise_floor: &[f64],
    local_window: usize,
    k_std: f64,
    snr_weight: f64,
) -> Vec<bool> {
    let (local_mean, local_std) = moving_mean_std(effective, local_window);

    effective
        .iter()
        .enumerate()
        .map(|(i, &e)| {
            let floor = noise_floor.get(i).copied().unwrap_or(0.0);
            let snr = (e / (floor + EPSILON)).min(MAX_LOCAL_SNR);
            let threshold = (local_mean[i] + k_std * local_std[i]) / (1.0 + snr_weight * snr);
            e > threshold
        })
        .collect()
}
