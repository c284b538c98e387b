//! Zero-phase Butterworth band-pass filter
//!
//! Each edge is a 4th-order Butterworth section pair (two biquads). The
//! cascade runs forward, then backward over the reversed output, so the
//! result has no phase shift and interval boundaries stay where they are.
//! Both ends are padded with an odd reflection of the signal to keep the
//! start-up transient out of the returned samples.

use std::f64::consts::PI;

use crate::config::Bandpass;

/// Butterworth order of each edge
pub const FILTER_ORDER: usize = 4;

/// Q factors of the two biquads making up a 4th-order Butterworth response
const BUTTERWORTH_Q: [f64; 2] = [0.541_196_100_146_197, 1.306_562_964_876_376_5];

/// Reflection padding on each side, in samples
const PAD_SAMPLES: usize = 3 * 2 * FILTER_ORDER;

#[derive(Debug, Clone, Copy)]
enum Edge {
    LowPass,
    HighPass,
}

/// Second-order section in Direct Form II transposed
#[derive(Debug, Clone)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn new(edge: Edge, cutoff_hz: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match edge {
            Edge::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            Edge::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn process(&mut self, sample: f64) -> f64 {
        let output = self.b0 * sample + self.z1;
        self.z1 = self.b1 * sample + self.z2 - self.a1 * output;
        self.z2 = self.b2 * sample - self.a2 * output;
        output
    }

    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

fn design(bandpass: &Bandpass, sample_rate: u32) -> Vec<Biquad> {
    let fs = sample_rate as f64;
    let nyquist = fs / 2.0;
    let mut sections = Vec::with_capacity(2 * BUTTERWORTH_Q.len());

    if bandpass.fcut_min > 0.0 {
        if bandpass.fcut_min < nyquist {
            for q in BUTTERWORTH_Q {
                sections.push(Biquad::new(Edge::HighPass, bandpass.fcut_min, q, fs));
            }
        } else {
            log::warn!(
                "High-pass cutoff {:.1} Hz at or above Nyquist ({:.1} Hz), edge skipped",
                bandpass.fcut_min,
                nyquist
            );
        }
    }

    if bandpass.fcut_max < nyquist {
        for q in BUTTERWORTH_Q {
            sections.push(Biquad::new(Edge::LowPass, bandpass.fcut_max, q, fs));
        }
    } else {
        log::warn!(
            "Low-pass cutoff {:.1} Hz at or above Nyquist ({:.1} Hz), edge skipped",
            bandpass.fcut_max,
            nyquist
        );
    }

    sections
}

fn run_cascade(sections: &mut [Biquad], data: &mut [f64]) {
    for section in sections.iter_mut() {
        section.reset();
        for x in data.iter_mut() {
            *x = section.process(*x);
        }
    }
}

/// Band-pass filter `samples` forward and backward
///
/// Returns a copy of the input when neither edge applies.
pub fn filtfilt_bandpass(samples: &[f64], sample_rate: u32, bandpass: &Bandpass) -> Vec<f64> {
    let mut sections = design(bandpass, sample_rate);
    if sections.is_empty() || samples.len() < 2 {
        return samples.to_vec();
    }

    let n = samples.len();
    let pad = PAD_SAMPLES.min(n - 1);
    let first = samples[0];
    let last = samples[n - 1];

    let mut data = Vec::with_capacity(n + 2 * pad);
    data.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i]));
    data.extend_from_slice(samples);
    data.extend((1..=pad).map(|i| 2.0 * last - samples[n - 1 - i]));

    run_cascade(&mut sections, &mut data);
    data.reverse();
    run_cascade(&mut sections, &mut data);
    data.reverse();

    log::debug!(
        "Zero-phase band-pass {:.1}-{:.1} Hz over {} samples ({} sections)",
        bandpass.fcut_min,
        bandpass.fcut_max,
        n,
        sections.len()
    );

    data[pad..pad + n].to_vec()
}
