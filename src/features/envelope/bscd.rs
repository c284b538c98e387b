//! Bayesian sequential change detector on signal power
//!
//! The squared signal is modeled as exponentially distributed power. The
//! background regime has the rate `λ₀ = 1 / median(power)`. For every sample
//! a window of `round(wlen·fs)` samples centred on it is scored by the log
//! Bayes factor of "this window has its own rate" (Gamma(a, a/λ₀) prior on
//! the rate, marginalized) against "this window is background":
//!
//! ```text
//! log m₁ = a·ln b − lnΓ(a) + lnΓ(a+m) − (a+m)·ln(b+S)      b = a/λ₀
//! log m₀ = m·ln λ₀ − λ₀·S
//! stat   = max(0, log m₁ − log m₀)
//! ```
//!
//! where `m` is the window length and `S` its summed power. Window sums come
//! from a prefix array so every sample costs O(1). The statistic is then
//! smoothed with a long moving average into a slow power envelope.

use super::{Envelope, EnvelopeAlgorithm, TimeAxis};
use crate::config::BscdConfig;
use crate::error::DetectionError;
use crate::features::segmentation::threshold::global_mean_mask;
use crate::features::smoothing::{moving_average, EPSILON};
use crate::preprocessing::PreprocessedSignal;
use crate::signal::seconds_to_samples;

/// Lanczos coefficients (g = 7, n = 9)
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0`
fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS[0];
    for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    let mid = sorted.len() / 2;
    let (_, m, _) = sorted.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *m
}

/// Bayesian sequential change detector
#[derive(Debug, Clone)]
pub struct Bscd {
    config: BscdConfig,
}

impl Bscd {
    /// Create the detector strategy for a validated configuration
    pub fn new(config: BscdConfig) -> Self {
        Self { config }
    }
}

/// Per-sample log Bayes factor of a local power regime against the background
pub fn change_statistic(samples: &[f64], sample_rate: u32, config: &BscdConfig) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let power: Vec<f64> = samples.iter().map(|&x| x * x).collect();
    let background = median(&power).max(EPSILON);
    let rate = 1.0 / background;
    let shape = config.prior_shape;
    let scale = shape * background;
    let prior_term = shape * scale.ln() - ln_gamma(shape);

    let half = (seconds_to_samples(config.wlen, sample_rate) / 2).max(1);

    let mut prefix = Vec::with_capacity(n + 1);
    let mut acc = 0.0f64;
    prefix.push(acc);
    for &p in &power {
        acc += p;
        prefix.push(acc);
    }

    log::debug!(
        "BSCD: {} samples, background power {:.3e}, half window {}",
        n,
        background,
        half
    );

    (0..n)
        .map(|t| {
            let lo = t.saturating_sub(half);
            let hi = (t + half).min(n);
            let m = (hi - lo) as f64;
            let s = prefix[hi] - prefix[lo];

            let own = prior_term + ln_gamma(shape + m) - (shape + m) * (scale + s).ln();
            let null = m * rate.ln() - rate * s;
            (own - null).max(0.0)
        })
        .collect()
}

impl EnvelopeAlgorithm for Bscd {
    fn name(&self) -> &'static str {
        "bscd"
    }

    fn compute_envelope(&self, signal: &PreprocessedSignal) -> Result<Envelope, DetectionError> {
        let statistic = change_statistic(&signal.samples, signal.sample_rate, &self.config);
        let values = moving_average(&statistic, self.config.ma_window);

        Ok(Envelope {
            values,
            axis: TimeAxis::samples(signal.sample_rate),
            noise_floor: None,
        })
    }

    fn threshold_mask(&self, envelope: &Envelope) -> Vec<bool> {
        global_mean_mask(&envelope.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize, amplitude: f64, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
                (unit * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    #[test]
    fn test_ln_gamma_known_values() {
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!(ln_gamma(2.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0f64.ln()).abs() < 1e-9);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-9);
        // ln(100!) = ln_gamma(101)
        let ln_fact: f64 = (1..=100).map(|k| (k as f64).ln()).sum();
        assert!((ln_gamma(101.0) - ln_fact).abs() < 1e-8);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_statistic_high_inside_burst() {
        let fs = 20_000u32;
        let mut x = noise(fs as usize, 0.01, 9);
        for (i, v) in x.iter_mut().enumerate().take(12_000).skip(8_000) {
            *v += 0.5 * (2.0 * std::f64::consts::PI * 3_000.0 * i as f64 / fs as f64).sin();
        }
        let config = BscdConfig {
            wlen: 0.002,
            ..BscdConfig::default()
        };
        let stat = change_statistic(&x, fs, &config);
        assert_eq!(stat.len(), x.len());

        let inside = stat[9_000..11_000].iter().sum::<f64>() / 2_000.0;
        let outside = stat[2_000..6_000].iter().sum::<f64>() / 4_000.0;
        assert!(inside > 100.0 * (outside + 1.0), "inside {} outside {}", inside, outside);
    }

    #[test]
    fn test_envelope_mask_covers_burst() {
        let fs = 20_000u32;
        let mut x = noise(fs as usize, 0.01, 21);
        for (i, v) in x.iter_mut().enumerate().take(12_000).skip(8_000) {
            *v += 0.5 * (2.0 * std::f64::consts::PI * 3_000.0 * i as f64 / fs as f64).sin();
        }
        let bscd = Bscd::new(BscdConfig {
            wlen: 0.002,
            ma_window: 200,
            ..BscdConfig::default()
        });
        let signal = PreprocessedSignal {
            samples: x,
            sample_rate: fs,
            roi_start: 0.0,
        };
        let envelope = bscd.compute_envelope(&signal).unwrap();
        let mask = bscd.threshold_mask(&envelope);

        assert!(mask[10_000]);
        assert!(!mask[3_000]);
        assert!(!mask[16_000]);
    }
}
