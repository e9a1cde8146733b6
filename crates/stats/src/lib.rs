//! Statistical helper functions for sympatry.
//!
//! Summaries of posterior draws and empirical checks on simulated presence
//! data. Every function is total: empty input yields `None` or `0.0`
//! rather than a panic.

use std::cmp::Ordering;

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with N-1 denominator. Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / (data.len() - 1) as f64
}

/// Returns a sorted copy of `data` with non-finite values removed.
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Quantile of pre-sorted data using linear interpolation between order
/// statistics (R's `quantile(type = 7)`).
///
/// Returns `None` if `sorted` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Median of pre-sorted data. Returns `None` if empty.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    quantile_sorted(sorted, 0.5)
}

/// Fraction of `true` entries. Returns 0.0 if empty.
pub fn frequency(flags: impl IntoIterator<Item = bool>) -> f64 {
    let (hits, total) = flags
        .into_iter()
        .fold((0usize, 0usize), |(h, t), f| (h + usize::from(f), t + 1));
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Fraction of paired entries where both `a[i]` and `b[i]` are `true`.
///
/// Pairs beyond the shorter slice are ignored.
pub fn cooccurrence_rate(a: &[bool], b: &[bool]) -> f64 {
    frequency(a.iter().zip(b).map(|(&x, &y)| x && y))
}

/// Largest absolute element-wise difference. Returns 0.0 if either is empty.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]), 3.0, epsilon = 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_variance() {
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-10);
        assert_eq!(variance(&[5.0]), 0.0);
    }

    #[test]
    fn test_sorted_finite_drops_nan() {
        let s = sorted_finite(&[3.0, f64::NAN, 1.0, f64::INFINITY, 2.0]);
        assert_eq!(s, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted: Vec<f64> = (1..=10).map(f64::from).collect();
        // R: quantile(1:10, 0.3) = 3.7
        assert_relative_eq!(quantile_sorted(&sorted, 0.3).unwrap(), 3.7, epsilon = 1e-10);
        assert_relative_eq!(quantile_sorted(&sorted, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile_sorted(&sorted, 1.0).unwrap(), 10.0);
    }

    #[test]
    fn test_quantile_rejects_bad_input() {
        assert!(quantile_sorted(&[], 0.5).is_none());
        assert!(quantile_sorted(&[1.0], 1.5).is_none());
    }

    #[test]
    fn test_median() {
        assert_relative_eq!(median_sorted(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
        assert_relative_eq!(median_sorted(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
        assert!(median_sorted(&[]).is_none());
    }

    #[test]
    fn test_frequency() {
        assert_relative_eq!(frequency([true, false, true, true]), 0.75);
        assert_eq!(frequency(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_cooccurrence_rate() {
        let a = [true, true, false, false];
        let b = [true, false, true, false];
        assert_relative_eq!(cooccurrence_rate(&a, &b), 0.25);
    }

    #[test]
    fn test_max_abs_diff() {
        assert_relative_eq!(max_abs_diff(&[0.1, 0.5], &[0.2, 0.2]), 0.3, epsilon = 1e-12);
        assert_eq!(max_abs_diff(&[], &[1.0]), 0.0);
    }
}
