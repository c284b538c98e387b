//! DC removal, peak normalization and region cropping
//!
//! # Example
//!
//! ```
//! use usv_detect::preprocessing::normalization::remove_dc_and_normalize;
//!
//! let normalized = remove_dc_and_normalize(&[1.0, 3.0, 2.0])?;
//! assert_eq!(normalized, vec![-1.0, 1.0, 0.0]);
//! # Ok::<(), usv_detect::DetectionError>(())
//! ```

use crate::config::Region;
use crate::error::DetectionError;
use crate::signal::seconds_to_samples;

/// Subtract the arithmetic mean, then divide by the largest absolute sample
///
/// Returns a new `f64` buffer; the input is left untouched.
///
/// # Errors
///
/// `DegenerateSignal` if the input is empty or constant (peak of zero after
/// mean removal), since the normalization gain would be undefined.
pub fn remove_dc_and_normalize(samples: &[f32]) -> Result<Vec<f64>, DetectionError> {
    if samples.is_empty() {
        return Err(DetectionError::DegenerateSignal(
            "Empty audio samples".to_string(),
        ));
    }

    let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / samples.len() as f64;
    let mut centered: Vec<f64> = samples.iter().map(|&x| x as f64 - mean).collect();

    let peak = centered.iter().map(|x| x.abs()).fold(0.0f64, f64::max);
    if peak <= 0.0 || !peak.is_finite() {
        return Err(DetectionError::DegenerateSignal(
            "Signal is all zero after DC removal, cannot normalize".to_string(),
        ));
    }

    for sample in centered.iter_mut() {
        *sample /= peak;
    }

    log::debug!(
        "Peak normalization: {} samples, mean={:.6}, peak={:.6}",
        samples.len(),
        mean,
        peak
    );

    Ok(centered)
}

/// Sample bounds `[start, end)` of a region, with the region start in seconds
///
/// A fixed region `{start, length}` covers the 1-based inclusive samples
/// `round(start·fs)+1 ..= round((start+length)·fs)`.
///
/// # Errors
///
/// `DegenerateSignal` when the region is empty or extends past the signal.
pub fn region_bounds(
    region: &Region,
    len: usize,
    sample_rate: u32,
) -> Result<(usize, usize, f64), DetectionError> {
    match *region {
        Region::Whole => Ok((0, len, 0.0)),
        Region::Fixed { start, length } => {
            let first = seconds_to_samples(start, sample_rate);
            let last = seconds_to_samples(start + length, sample_rate);
            if first >= last || last > len {
                return Err(DetectionError::DegenerateSignal(format!(
                    "Region {:.6}s + {:.6}s (samples {}..{}) outside signal of {} samples",
                    start, length, first, last, len
                )));
            }
            Ok((first, last, start))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_zero_mean_unit_peak() {
        let samples = vec![0.5f32, 1.5, 0.5, -0.5, 0.5];
        let out = remove_dc_and_normalize(&samples).unwrap();

        let mean: f64 = out.iter().sum::<f64>() / out.len() as f64;
        let peak = out.iter().map(|x| x.abs()).fold(0.0f64, f64::max);
        assert!(mean.abs() < 1e-12);
        assert!((peak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalization_scale_invariant() {
        let samples: Vec<f32> = (0..1000).map(|i| ((i as f32) * 0.37).sin() * 0.3 + 0.1).collect();
        let doubled: Vec<f32> = samples.iter().map(|&x| x * 2.0).collect();

        let a = remove_dc_and_normalize(&samples).unwrap();
        let b = remove_dc_and_normalize(&doubled).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_silent_audio() {
        let result = remove_dc_and_normalize(&[0.0f32; 100]);
        assert!(matches!(result, Err(DetectionError::DegenerateSignal(_))));
    }

    #[test]
    fn test_constant_audio_is_degenerate() {
        let result = remove_dc_and_normalize(&[0.25f32; 100]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_samples() {
        assert!(remove_dc_and_normalize(&[]).is_err());
    }

    #[test]
    fn test_region_whole() {
        assert_eq!(region_bounds(&Region::Whole, 500, 1000).unwrap(), (0, 500, 0.0));
    }

    #[test]
    fn test_region_fixed_bounds() {
        let region = Region::Fixed {
            start: 0.1,
            length: 0.2,
        };
        // 1-based samples 101..=300
        let (first, last, start) = region_bounds(&region, 1000, 1000).unwrap();
        assert_eq!((first, last), (100, 300));
        assert!((start - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_region_outside_signal() {
        let region = Region::Fixed {
            start: 0.9,
            length: 0.2,
        };
        let result = region_bounds(&region, 1000, 1000);
        assert!(matches!(result, Err(DetectionError::DegenerateSignal(_))));
    }
}
