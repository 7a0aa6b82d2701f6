//! Byte-value count vectors and the similarity measures between them

use crate::error::{AnalysisError, Result};
use crate::utils::Alphabet;

/// Margin keeping `cos θ` strictly inside (-1, 1) before `acos`
const ANGLE_EPSILON: f64 = 0.0000001;

/// Count of each value in `[0, dimension)` with cached totals.
///
/// Vectors are immutable once built, so `total` and `sum_of_squares` always
/// agree with `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyVector {
    counts: Vec<u64>,
    total: u64,
    sum_of_squares: f64,
}

impl FrequencyVector {
    /// Count every byte of `bytes` over the alphabet.
    ///
    /// A byte outside the alphabet is an error, never wrapped or dropped.
    pub fn build(bytes: &[u8], alphabet: Alphabet) -> Result<Self> {
        let mut counts = vec![0u64; alphabet.size()];

        for &b in bytes {
            if !alphabet.contains(b) {
                return Err(AnalysisError::ValueOutOfRange {
                    value: b,
                    alphabet: alphabet.size(),
                });
            }
            counts[b as usize] += 1;
        }

        Ok(Self::from_counts(counts))
    }

    /// Wrap an existing count table
    pub fn from_counts(counts: Vec<u64>) -> Self {
        let total = counts.iter().sum();
        let sum_of_squares = counts.iter().map(|&c| (c as f64) * (c as f64)).sum();
        Self {
            counts,
            total,
            sum_of_squares,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn count(&self, value: usize) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    pub fn dimension(&self) -> usize {
        self.counts.len()
    }

    /// Share of the total taken by `value`
    pub fn proportion(&self, value: usize) -> Result<f64> {
        if self.total == 0 {
            return Err(AnalysisError::DivisionByZero("proportion of an empty vector"));
        }
        Ok(self.count(value) as f64 / self.total as f64)
    }
}

/// Chi-squared statistic of `actual` against the distribution of `expected`.
///
/// Expected counts are scaled by `actual.total / expected.total`. Bins with a
/// zero expected count are skipped, so values the reference never contains
/// add nothing to the statistic.
pub fn chi_squared(actual: &FrequencyVector, expected: &FrequencyVector) -> Result<f64> {
    check_comparable(actual, expected)?;

    let ratio = actual.total as f64 / expected.total as f64;

    let statistic = expected
        .counts
        .iter()
        .zip(&actual.counts)
        .filter(|(&e, _)| e != 0)
        .map(|(&e, &a)| {
            let scaled = e as f64 * ratio;
            let n = a as f64 - scaled;
            n * n / scaled
        })
        .sum();

    Ok(statistic)
}

/// Angle in radians between two count vectors; 0 means same direction.
pub fn cosine_distance(v1: &FrequencyVector, v2: &FrequencyVector) -> Result<f64> {
    check_comparable(v1, v2)?;

    let dot: f64 = v1
        .counts
        .iter()
        .zip(&v2.counts)
        .map(|(&a, &b)| a as f64 * b as f64)
        .sum();

    let cos_theta = dot / (v1.sum_of_squares.sqrt() * v2.sum_of_squares.sqrt());

    Ok(cos_theta
        .clamp(-1.0 + ANGLE_EPSILON, 1.0 - ANGLE_EPSILON)
        .acos())
}

/// The value [`cosine_distance`] returns for vectors pointing the same way
pub fn identical_angle() -> f64 {
    (1.0 - ANGLE_EPSILON).acos()
}

fn check_comparable(v1: &FrequencyVector, v2: &FrequencyVector) -> Result<()> {
    if v1.dimension() != v2.dimension() {
        return Err(AnalysisError::DimensionMismatch {
            left: v1.dimension(),
            right: v2.dimension(),
        });
    }
    if v1.total == 0 || v2.total == 0 {
        return Err(AnalysisError::DivisionByZero("comparison with an empty vector"));
    }
    Ok(())
}

/// Similarity measure, lower is more similar for both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    ChiSquared,
    #[default]
    VectorAngle,
}

impl Metric {
    pub fn score(&self, actual: &FrequencyVector, reference: &FrequencyVector) -> Result<f64> {
        match self {
            Metric::ChiSquared => chi_squared(actual, reference),
            Metric::VectorAngle => cosine_distance(actual, reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(bytes: &[u8]) -> FrequencyVector {
        FrequencyVector::build(bytes, Alphabet::default()).unwrap()
    }

    #[test]
    fn test_build_counts() {
        let v = vector(b"hello");
        assert_eq!(v.total(), 5);
        assert_eq!(v.count(b'l' as usize), 2);
        assert_eq!(v.sum_of_squares(), 7.0);
        assert_eq!(v.dimension(), 256);
        assert_eq!(v.proportion(b'h' as usize).unwrap(), 0.2);
    }

    #[test]
    fn test_build_rejects_out_of_alphabet() {
        let letters = Alphabet::new(26).unwrap();
        let result = FrequencyVector::build(&[0, 25, 26], letters);
        assert!(matches!(
            result,
            Err(AnalysisError::ValueOutOfRange { value: 26, alphabet: 26 })
        ));
    }

    #[test]
    fn test_chi_squared_self_is_zero() {
        let v = vector(b"the quick brown fox jumps over the lazy dog");
        assert_eq!(chi_squared(&v, &v).unwrap(), 0.0);
    }

    #[test]
    fn test_chi_squared_scales_expected() {
        let actual = FrequencyVector::from_counts(vec![2, 2, 0]);
        let expected = FrequencyVector::from_counts(vec![1, 3, 0]);
        // ratio 1, expected (1, 3): 1/1 + 1/3
        let chi = chi_squared(&actual, &expected).unwrap();
        assert!((chi - (1.0 + 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_chi_squared_skips_zero_expected_bins() {
        let expected = FrequencyVector::from_counts(vec![5, 5, 0]);
        let clean = FrequencyVector::from_counts(vec![5, 5, 0]);
        let noisy = FrequencyVector::from_counts(vec![5, 5, 90]);
        assert_eq!(chi_squared(&clean, &expected).unwrap(), 0.0);
        // the 90 counts in the third bin are invisible, only the ratio shifts
        let chi = chi_squared(&noisy, &expected).unwrap();
        assert!((chi - 2.0 * (5.0f64 - 50.0).powi(2) / 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_distance_identical_and_orthogonal() {
        let v = vector(b"abcabcabd");
        assert_eq!(cosine_distance(&v, &v).unwrap(), identical_angle());

        let scaled = FrequencyVector::from_counts(vec![2, 4, 6]);
        let base = FrequencyVector::from_counts(vec![1, 2, 3]);
        assert_eq!(cosine_distance(&base, &scaled).unwrap(), identical_angle());

        let x = FrequencyVector::from_counts(vec![1, 0]);
        let y = FrequencyVector::from_counts(vec![0, 1]);
        let angle = cosine_distance(&x, &y).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_distance_orders_similarity() {
        let reference = vector(b"eeeeettttaaoinshr");
        let close = vector(b"eeeettttaaoinsh");
        let far = vector(b"zzzzqqqxxj");
        let d_close = cosine_distance(&close, &reference).unwrap();
        let d_far = cosine_distance(&far, &reference).unwrap();
        assert!(d_close < d_far);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = FrequencyVector::from_counts(vec![1, 2]);
        let b = FrequencyVector::from_counts(vec![1, 2, 3]);
        assert!(matches!(
            cosine_distance(&a, &b),
            Err(AnalysisError::DimensionMismatch { left: 2, right: 3 })
        ));
        assert!(matches!(
            chi_squared(&a, &b),
            Err(AnalysisError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_vectors_never_yield_nan() {
        let empty = vector(b"");
        let full = vector(b"abc");
        for metric in [Metric::ChiSquared, Metric::VectorAngle] {
            assert!(matches!(
                metric.score(&empty, &full),
                Err(AnalysisError::DivisionByZero(_))
            ));
            assert!(matches!(
                metric.score(&full, &empty),
                Err(AnalysisError::DivisionByZero(_))
            ));
        }
        assert!(empty.proportion(0).is_err());
    }
}
