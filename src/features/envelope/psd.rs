//! Band-limited spectral power envelope
//!
//! Algorithm:
//! 1. Hann-windowed STFT (`segment_length`, hop from `overlap_factor`)
//! 2. Sum `|X_k|²` over the bins inside `[band.min_hz, band.max_hz]`
//! 3. Peak-normalize, then moving average over `ma_window` frames
//! 4. Noise floor = running minimum over `noise_window` frames
//! 5. Effective envelope = `max(envelope − floor, 0)`
//!
//! The envelope lives on the frame axis; frame `k` is centred at
//! `(k·hop + segment_length/2) / fs`.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::{Envelope, EnvelopeAlgorithm, TimeAxis};
use crate::config::PsdConfig;
use crate::error::DetectionError;
use crate::features::segmentation::threshold::local_snr_mask;
use crate::features::smoothing::{moving_average, moving_min, peak_normalize_in_place};
use crate::labels::postprocess::remove_low_power_labels;
use crate::labels::Label;
use crate::preprocessing::PreprocessedSignal;

/// Spectral-power detector
#[derive(Debug, Clone)]
pub struct Psd {
    config: PsdConfig,
}

impl Psd {
    /// Create the detector strategy for a validated configuration
    pub fn new(config: PsdConfig) -> Self {
        Self { config }
    }

    /// Samples between consecutive frames
    pub fn hop(&self) -> usize {
        let hop = (self.config.segment_length as f64 * (1.0 - self.config.overlap_factor)).round();
        (hop as usize).max(1)
    }
}

fn hann_window(len: usize) -> Vec<f64> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| {
            0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (len - 1) as f64).cos()
        })
        .collect()
}

/// Bins `[first, last]` whose centre frequency lies inside the band
fn band_bins(
    segment_length: usize,
    sample_rate: u32,
    min_hz: f64,
    max_hz: f64,
) -> Option<(usize, usize)> {
    let resolution = sample_rate as f64 / segment_length as f64;
    let bins: Vec<usize> = (0..=segment_length / 2)
        .filter(|&k| {
            let freq = k as f64 * resolution;
            freq >= min_hz && freq <= max_hz
        })
        .collect();
    Some((*bins.first()?, *bins.last()?))
}

/// In-band power per STFT frame
///
/// # Errors
///
/// `InvalidConfig` if no FFT bin falls inside the band at this sample rate.
pub fn band_power(
    samples: &[f64],
    sample_rate: u32,
    config: &PsdConfig,
    hop: usize,
) -> Result<Vec<f64>, DetectionError> {
    let len = config.segment_length;
    let (first_bin, last_bin) = band_bins(len, sample_rate, config.band.min_hz, config.band.max_hz)
        .ok_or_else(|| {
            DetectionError::InvalidConfig(format!(
                "No FFT bin of a {}-sample segment at {} Hz lies in {:.1}-{:.1} Hz",
                len, sample_rate, config.band.min_hz, config.band.max_hz
            ))
        })?;

    if samples.len() < len {
        log::warn!(
            "Signal of {} samples shorter than one {}-sample segment, no frames",
            samples.len(),
            len
        );
        return Ok(Vec::new());
    }
    let num_frames = (samples.len() - len) / hop + 1;

    let window = hann_window(len);
    let mut planner = FftPlanner::<f64>::new();
    let fft: Arc<dyn Fft<f64>> = planner.plan_fft_forward(len);

    log::debug!(
        "PSD: {} frames of {} samples (hop {}), bins {}..={}",
        num_frames,
        len,
        hop,
        first_bin,
        last_bin
    );

    let power = (0..num_frames)
        .into_par_iter()
        .map(|frame| {
            let start = frame * hop;
            let mut buffer: Vec<Complex<f64>> = samples[start..start + len]
                .iter()
                .zip(&window)
                .map(|(&x, &w)| Complex::new(x * w, 0.0))
                .collect();
            fft.process(&mut buffer);
            buffer[first_bin..=last_bin]
                .iter()
                .map(|c| c.norm_sqr())
                .sum::<f64>()
        })
        .collect();

    Ok(power)
}

impl EnvelopeAlgorithm for Psd {
    fn name(&self) -> &'static str {
        "psd"
    }

    fn compute_envelope(&self, signal: &PreprocessedSignal) -> Result<Envelope, DetectionError> {
        let hop = self.hop();
        let mut power = band_power(&signal.samples, signal.sample_rate, &self.config, hop)?;
        peak_normalize_in_place(&mut power);

        let smoothed = moving_average(&power, self.config.ma_window);
        let noise_floor = moving_min(&smoothed, self.config.noise_window);
        let effective: Vec<f64> = smoothed
            .iter()
            .zip(&noise_floor)
            .map(|(&e, &f)| (e - f).max(0.0))
            .collect();

        Ok(Envelope {
            values: effective,
            axis: TimeAxis::frames(hop, self.config.segment_length, signal.sample_rate),
            noise_floor: Some(noise_floor),
        })
    }

    fn threshold_mask(&self, envelope: &Envelope) -> Vec<bool> {
        let floor = envelope.noise_floor.as_deref().unwrap_or(&[]);
        local_snr_mask(
            &envelope.values,
            floor,
            self.config.local_window,
            self.config.k_std,
            self.config.snr_weight,
        )
    }

    fn reject_labels(&self, labels: Vec<Label>, envelope: &Envelope) -> Vec<Label> {
        remove_low_power_labels(labels, &envelope.values, self.config.min_effective_power)
    }
}
