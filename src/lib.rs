//! # USV Detect
//!
//! Ultrasonic vocalization (USV) detection for long, high-sample-rate
//! recordings, and scoring of detector output against annotated labels.
//!
//! ## Features
//!
//! - **RBD**: change score from autoregressive model evidence, with a two-gate dynamic threshold
//! - **BSCD**: Bayesian sequential change statistic on signal power, with a global-mean threshold
//! - **PSD**: band-limited spectrogram power over an adaptive noise floor, with a local-SNR threshold
//! - **Post-processing**: gap merging, short-label rejection, low-power rejection
//! - **Scoring**: greedy one-to-one midpoint matching with precision, recall and F1
//!
//! ## Quick Start
//!
//! ```no_run
//! use usv_detect::{detect_labels, DetectorConfig};
//! use usv_detect::labels::text_format::write_detected_labels;
//!
//! // Mono samples recorded at 250 kHz
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let labels = detect_labels(&samples, 250_000, &DetectorConfig::default())?;
//!
//! for label in &labels {
//!     println!("{:.4}s - {:.4}s", label.start_time, label.end_time);
//! }
//! write_detected_labels("recording.txt", &labels)?;
//! # Ok::<(), usv_detect::DetectionError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Signal → Preprocessing → Envelope → Threshold → Runs → Post-processing → Labels → Scoring
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod io;
pub mod labels;
pub mod preprocessing;
pub mod signal;

// Re-export main types
pub use analysis::evaluation::{round_trip_labels, trial_objective};
pub use analysis::scoring::{score_label_files, score_labels, DetectionStats};
pub use config::DetectorConfig;
pub use detector::{detect_labels, Detector};
pub use error::DetectionError;
pub use io::decoder::decode_audio;
pub use labels::Label;
pub use signal::Signal;
