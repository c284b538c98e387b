//! Centred moving statistics
//!
//! Windows follow the `movmean` convention: a window of length `w` around
//! index `i` covers `[i - w/2, i + (w-1)/2]` and shrinks at the edges, so the
//! output always has the input length. Sums use prefix arrays, so cost does
//! not depend on `w`.

use std::collections::VecDeque;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-12;

#[inline]
fn window_bounds(i: usize, len: usize, window: usize) -> (usize, usize) {
    let start = i.saturating_sub(window / 2);
    let end = (i + (window - 1) / 2 + 1).min(len);
    (start, end)
}

fn prefix_sums(values: &[f64], square: bool) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(values.len() + 1);
    let mut acc = 0.0f64;
    prefix.push(acc);
    for &v in values {
        acc += if square { v * v } else { v };
        prefix.push(acc);
    }
    prefix
}

/// Centred moving average
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window <= 1 {
        return values.to_vec();
    }
    let prefix = prefix_sums(values, false);
    (0..values.len())
        .map(|i| {
            let (start, end) = window_bounds(i, values.len(), window);
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect()
}

/// Centred moving mean and population standard deviation
pub fn moving_mean_std(values: &[f64], window: usize) -> (Vec<f64>, Vec<f64>) {
    if values.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let window = window.max(1);
    let sums = prefix_sums(values, false);
    let squares = prefix_sums(values, true);

    let mut means = Vec::with_capacity(values.len());
    let mut stds = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let (start, end) = window_bounds(i, values.len(), window);
        let count = (end - start) as f64;
        let mean = (sums[end] - sums[start]) / count;
        let variance = ((squares[end] - squares[start]) / count - mean * mean).max(0.0);
        means.push(mean);
        stds.push(variance.sqrt());
    }
    (means, stds)
}

/// Centred running minimum (monotonic deque)
pub fn moving_min(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window <= 1 {
        return values.to_vec();
    }
    let len = values.len();
    let mut out = Vec::with_capacity(len);
    let mut deque: VecDeque<usize> = VecDeque::new();
    let mut next = 0usize;

    for i in 0..len {
        let (start, end) = window_bounds(i, len, window);
        while next < end {
            while deque.back().is_some_and(|&j| values[j] >= values[next]) {
                deque.pop_back();
            }
            deque.push_back(next);
            next += 1;
        }
        while deque.front().is_some_and(|&j| j < start) {
            deque.pop_front();
        }
        if let Some(&j) = deque.front() {
            out.push(values[j]);
        }
    }
    out
}

/// Divide by the maximum value in place (no-op when the maximum is ~0)
pub fn peak_normalize_in_place(values: &mut [f64]) {
    let max_val = values.iter().copied().fold(0.0f64, f64::max);
    if max_val > EPSILON {
        for v in values.iter_mut() {
            *v /= max_val;
        }
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_odd_window() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = moving_average(&x, 3);
        assert_eq!(y, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
    }

    #[test]
    fn test_moving_average_even_window() {
        // w = 4 covers [i-2, i+1]
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = moving_average(&x, 4);
        assert!((y[0] - 1.5).abs() < 1e-12);
        assert!((y[2] - 2.5).abs() < 1e-12);
        assert!((y[4] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let x = vec![3.0, -1.0, 2.0];
        assert_eq!(moving_average(&x, 1), x);
    }

    #[test]
    fn test_moving_mean_std_constant() {
        let x = vec![2.0; 10];
        let (m, s) = moving_mean_std(&x, 4);
        assert!(m.iter().all(|&v| (v - 2.0).abs() < 1e-12));
        assert!(s.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_moving_mean_std_values() {
        let x = vec![0.0, 2.0, 0.0, 2.0];
        let (m, s) = moving_mean_std(&x, 3);
        assert!((m[1] - 2.0 / 3.0).abs() < 1e-12);
        let expected_std = ((4.0 / 3.0) - (2.0 / 3.0f64).powi(2)).sqrt();
        assert!((s[1] - expected_std).abs() < 1e-12);
    }

    #[test]
    fn test_moving_min_matches_naive() {
        let x: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64).collect();
        for window in [2usize, 3, 7, 10, 60] {
            let fast = moving_min(&x, window);
            for i in 0..x.len() {
                let (start, end) = window_bounds(i, x.len(), window);
                let naive = x[start..end].iter().copied().fold(f64::INFINITY, f64::min);
                assert_eq!(fast[i], naive, "window {} index {}", window, i);
            }
        }
    }

    #[test]
    fn test_peak_normalize() {
        let mut x = vec![0.0, 2.0, 4.0];
        peak_normalize_in_place(&mut x);
        assert_eq!(x, vec![0.0, 0.5, 1.0]);

        let mut zeros = vec![0.0; 3];
        peak_normalize_in_place(&mut zeros);
        assert_eq!(zeros, vec![0.0; 3]);
    }
}
