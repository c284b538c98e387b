//! Configuration parameters for the detectors
//!
//! Every detector variant owns its parameter struct. All structs are plain
//! values with defaults tuned for recordings sampled around 250 kHz, and all
//! of them deserialize from partial JSON (missing fields take the default).
//!
//! ```no_run
//! use usv_detect::DetectorConfig;
//!
//! let config = DetectorConfig::from_json_str(r#"{ "method": "psd", "k_std": 1.5 }"#)?;
//! config.validate()?;
//! # Ok::<(), usv_detect::DetectionError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Band-pass cutoffs applied during preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bandpass {
    /// Lower cutoff in Hz (0 disables the high-pass edge)
    pub fcut_min: f64,
    /// Upper cutoff in Hz (at or above Nyquist disables the low-pass edge)
    pub fcut_max: f64,
}

/// Part of the recording handed to the envelope algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Region {
    /// Analyze the whole signal
    Whole,
    /// Analyze `length` seconds starting at `start` seconds
    Fixed {
        /// Region start in seconds
        start: f64,
        /// Region length in seconds
        length: f64,
    },
}

/// Preprocessing options shared by all variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Optional zero-phase band-pass filter (default: 20-120 kHz)
    pub bandpass: Option<Bandpass>,

    /// Region of interest (default: whole signal)
    pub region: Region,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            bandpass: Some(Bandpass {
                fcut_min: 20_000.0,
                fcut_max: 120_000.0,
            }),
            region: Region::Whole,
        }
    }
}

/// Label post-processing options shared by all variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Labels separated by a gap strictly shorter than this are merged (seconds, default: 0.01)
    pub max_gap: f64,

    /// Labels shorter than this are dropped (seconds, default: 0.005)
    pub min_duration: f64,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            max_gap: 0.01,
            min_duration: 0.005,
        }
    }
}

/// Recursive change-score (autoregressive evidence) detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbdConfig {
    /// Preprocessing
    pub preprocess: PreprocessConfig,
    /// Post-processing
    pub post: PostProcessConfig,

    /// Analysis window length in seconds (default: 0.004)
    pub wlen: f64,

    /// Stride between evaluated window centres in seconds (default: 0.0005)
    pub step: f64,

    /// AR order of the left sub-window model (default: 6)
    pub left_order: usize,

    /// AR order of the right sub-window model (default: 6)
    pub right_order: usize,

    /// AR order of the shared model used for the evidence comparison (default: 6)
    pub evidence_order: usize,

    /// Score smoothing window in seconds (default: 0.002)
    pub smoothing_window_rbd: f64,

    /// Dynamic threshold window in seconds (default: 0.05)
    pub smoothing_window_thr: f64,

    /// Multiplier on the dynamic threshold (default: 1.2)
    pub dynamic_scaling: f64,

    /// Fixed floor the smoothed score must also exceed (default: 0.05)
    pub amplitude_threshold: f64,
}

impl Default for RbdConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            post: PostProcessConfig::default(),
            wlen: 0.004,
            step: 0.0005,
            left_order: 6,
            right_order: 6,
            evidence_order: 6,
            smoothing_window_rbd: 0.002,
            smoothing_window_thr: 0.05,
            dynamic_scaling: 1.2,
            amplitude_threshold: 0.05,
        }
    }
}

/// Bayesian sequential change detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BscdConfig {
    /// Preprocessing
    pub preprocess: PreprocessConfig,
    /// Post-processing
    pub post: PostProcessConfig,

    /// Evidence window length in seconds (default: 0.002)
    pub wlen: f64,

    /// Moving-average length applied to the statistic, in samples (default: 2500)
    pub ma_window: usize,

    /// Shape of the Gamma prior on the power rate (default: 1.0)
    pub prior_shape: f64,
}

impl Default for BscdConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            post: PostProcessConfig::default(),
            wlen: 0.002,
            ma_window: 2500,
            prior_shape: 1.0,
        }
    }
}

/// Frequency band summed by the spectral detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    /// Lowest frequency included, Hz
    pub min_hz: f64,
    /// Highest frequency included, Hz
    pub max_hz: f64,
}

/// Spectral-power detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsdConfig {
    /// Preprocessing (no band-pass by default, the band sum already restricts frequency)
    pub preprocess: PreprocessConfig,
    /// Post-processing
    pub post: PostProcessConfig,

    /// STFT segment length in samples (default: 512)
    pub segment_length: usize,

    /// Fractional overlap between segments, in [0, 1) (default: 0.5)
    pub overlap_factor: f64,

    /// Band summed per frame (default: 30-110 kHz)
    pub band: FrequencyBand,

    /// Envelope smoothing window in frames (default: 5)
    pub ma_window: usize,

    /// Running-minimum noise floor window in frames (default: 200)
    pub noise_window: usize,

    /// Local statistics window in frames (default: 50)
    pub local_window: usize,

    /// Standard deviations above the local mean (default: 1.0)
    pub k_std: f64,

    /// How strongly local SNR relaxes the threshold (default: 0.5)
    pub snr_weight: f64,

    /// Minimum mean effective power of a kept label (default: 0.01)
    pub min_effective_power: f64,
}

impl Default for PsdConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig {
                bandpass: None,
                region: Region::Whole,
            },
            post: PostProcessConfig::default(),
            segment_length: 512,
            overlap_factor: 0.5,
            band: FrequencyBand {
                min_hz: 30_000.0,
                max_hz: 110_000.0,
            },
            ma_window: 5,
            noise_window: 200,
            local_window: 50,
            k_std: 1.0,
            snr_weight: 0.5,
            min_effective_power: 0.01,
        }
    }
}

/// Detector selection with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum DetectorConfig {
    /// Recursive change-score detector
    Rbd(RbdConfig),
    /// Bayesian sequential change detector
    Bscd(BscdConfig),
    /// Spectral-power detector
    Psd(PsdConfig),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig::Psd(PsdConfig::default())
    }
}

impl DetectorConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, DetectionError> {
        serde_json::from_str(json).map_err(|e| DetectionError::InvalidConfig(e.to_string()))
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DetectionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::IoFailure(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Short method name ("rbd", "bscd", "psd")
    pub fn method(&self) -> &'static str {
        match self {
            DetectorConfig::Rbd(_) => "rbd",
            DetectorConfig::Bscd(_) => "bscd",
            DetectorConfig::Psd(_) => "psd",
        }
    }

    /// Preprocessing options of the selected variant
    pub fn preprocess(&self) -> &PreprocessConfig {
        match self {
            DetectorConfig::Rbd(c) => &c.preprocess,
            DetectorConfig::Bscd(c) => &c.preprocess,
            DetectorConfig::Psd(c) => &c.preprocess,
        }
    }

    /// Post-processing options of the selected variant
    pub fn post(&self) -> &PostProcessConfig {
        match self {
            DetectorConfig::Rbd(c) => &c.post,
            DetectorConfig::Bscd(c) => &c.post,
            DetectorConfig::Psd(c) => &c.post,
        }
    }

    /// Check every parameter of the selected variant
    pub fn validate(&self) -> Result<(), DetectionError> {
        self.preprocess().validate()?;
        self.post().validate()?;
        match self {
            DetectorConfig::Rbd(c) => c.validate(),
            DetectorConfig::Bscd(c) => c.validate(),
            DetectorConfig::Psd(c) => c.validate(),
        }
    }
}

fn ensure(condition: bool, msg: impl FnOnce() -> String) -> Result<(), DetectionError> {
    if condition {
        Ok(())
    } else {
        Err(DetectionError::InvalidConfig(msg()))
    }
}

fn positive(name: &str, value: f64) -> Result<(), DetectionError> {
    ensure(value.is_finite() && value > 0.0, || {
        format!("{} must be a positive number, got {}", name, value)
    })
}

fn non_negative(name: &str, value: f64) -> Result<(), DetectionError> {
    ensure(value.is_finite() && value >= 0.0, || {
        format!("{} must be a non-negative number, got {}", name, value)
    })
}

impl PreprocessConfig {
    /// Check cutoffs and region bounds
    pub fn validate(&self) -> Result<(), DetectionError> {
        if let Some(bp) = &self.bandpass {
            non_negative("fcut_min", bp.fcut_min)?;
            positive("fcut_max", bp.fcut_max)?;
            ensure(bp.fcut_max > bp.fcut_min, || {
                format!(
                    "fcut_max ({}) must be greater than fcut_min ({})",
                    bp.fcut_max, bp.fcut_min
                )
            })?;
        }
        if let Region::Fixed { start, length } = self.region {
            non_negative("region start", start)?;
            positive("region length", length)?;
        }
        Ok(())
    }
}

impl PostProcessConfig {
    /// Check gap and duration limits
    pub fn validate(&self) -> Result<(), DetectionError> {
        non_negative("max_gap", self.max_gap)?;
        non_negative("min_duration", self.min_duration)
    }
}

impl RbdConfig {
    /// Check window lengths, model orders and threshold factors
    pub fn validate(&self) -> Result<(), DetectionError> {
        positive("wlen", self.wlen)?;
        positive("step", self.step)?;
        ensure(self.left_order >= 1 && self.right_order >= 1, || {
            "left_order and right_order must be >= 1".to_string()
        })?;
        ensure(self.evidence_order >= 1, || "evidence_order must be >= 1".to_string())?;
        positive("smoothing_window_rbd", self.smoothing_window_rbd)?;
        positive("smoothing_window_thr", self.smoothing_window_thr)?;
        non_negative("dynamic_scaling", self.dynamic_scaling)?;
        non_negative("amplitude_threshold", self.amplitude_threshold)
    }
}

impl BscdConfig {
    /// Check window lengths and the prior
    pub fn validate(&self) -> Result<(), DetectionError> {
        positive("wlen", self.wlen)?;
        ensure(self.ma_window >= 1, || "ma_window must be >= 1".to_string())?;
        positive("prior_shape", self.prior_shape)
    }
}

impl PsdConfig {
    /// Check STFT layout, band and threshold factors
    pub fn validate(&self) -> Result<(), DetectionError> {
        ensure(self.segment_length >= 2, || {
            format!("segment_length must be >= 2, got {}", self.segment_length)
        })?;
        ensure(
            self.overlap_factor.is_finite() && (0.0..1.0).contains(&self.overlap_factor),
            || format!("overlap_factor must be in [0, 1), got {}", self.overlap_factor),
        )?;
        non_negative("band min_hz", self.band.min_hz)?;
        ensure(self.band.max_hz > self.band.min_hz, || {
            format!(
                "band max_hz ({}) must be greater than min_hz ({})",
                self.band.max_hz, self.band.min_hz
            )
        })?;
        ensure(
            self.ma_window >= 1 && self.noise_window >= 1 && self.local_window >= 1,
            || "ma_window, noise_window and local_window must be >= 1".to_string(),
        )?;
        ensure(self.k_std.is_finite(), || "k_std must be finite".to_string())?;
        non_negative("snr_weight", self.snr_weight)?;
        non_negative("min_effective_power", self.min_effective_power)
    }
}
