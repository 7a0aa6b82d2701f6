//! Key length estimation from the index of coincidence
//!
//! Text enciphered with one key byte keeps the uneven byte distribution of
//! its plaintext. Splitting a repeating-key ciphertext into the right number
//! of columns therefore gives columns with a high index of coincidence, while
//! a wrong guess mixes key bytes and flattens the counts.

use std::ops::RangeInclusive;

use crate::error::{AnalysisError, Result};
use crate::utils::{split_columns, MAX_ALPHABET};

/// Average column IC for one candidate key length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyLengthScore {
    pub key_length: usize,
    pub average_ic: f64,
    /// Columns with at least two bytes; the others have no IC
    pub columns_used: usize,
}

/// Scores for every key length of the examined range
#[derive(Debug, Clone, Default)]
pub struct KeyLengthReport {
    pub scores: Vec<KeyLengthScore>,
}

impl KeyLengthReport {
    /// Highest average IC, the smaller key length on ties
    pub fn best(&self) -> Option<&KeyLengthScore> {
        // scores are in ascending key length, so only a strictly larger IC wins
        self.scores.iter().fold(None, |best: Option<&KeyLengthScore>, s| match best {
            Some(b) if b.average_ic >= s.average_ic => Some(b),
            _ => Some(s),
        })
    }

    pub fn get(&self, key_length: usize) -> Option<&KeyLengthScore> {
        self.scores.iter().find(|s| s.key_length == key_length)
    }
}

/// Index of coincidence of one column of bytes.
///
/// `Σ n_i (n_i - 1) / (T (T - 1))`, `None` when `T < 2`.
pub fn column_ic(column: &[u8]) -> Option<f64> {
    let total = column.len();
    if total < 2 {
        return None;
    }

    let mut counts = [0u64; MAX_ALPHABET];
    for &b in column {
        counts[b as usize] += 1;
    }

    let numerator: f64 = counts
        .iter()
        .map(|&n| (n * n.saturating_sub(1)) as f64)
        .sum();

    Some(numerator / (total as f64 * (total as f64 - 1.0)))
}

/// Average column IC for every key length in `range`.
///
/// Columns too short to have an IC are left out of the average; a key length
/// where that leaves nothing is left out of the report.
pub fn estimate_key_length(ciphertext: &[u8], range: RangeInclusive<usize>) -> Result<KeyLengthReport> {
    let (min, max) = (*range.start(), *range.end());
    if min == 0 || min > max {
        return Err(AnalysisError::InvalidKeyLength(format!(
            "range {}..={} must start at 1 or more and not be empty",
            min, max
        )));
    }

    let mut report = KeyLengthReport::default();

    for key_length in range {
        // column 0 is the longest and needs a second byte at offset L
        if key_length >= ciphertext.len() {
            tracing::debug!(
                "key length {} and up exceed the {} byte text, stopping",
                key_length,
                ciphertext.len()
            );
            break;
        }
        let columns = split_columns(ciphertext, key_length);
        let ics: Vec<f64> = columns.iter().filter_map(|c| column_ic(c)).collect();

        if ics.is_empty() {
            tracing::debug!("key length {}: no column has two bytes, skipped", key_length);
            continue;
        }
        if ics.len() < key_length {
            tracing::debug!(
                "key length {}: {} of {} columns too short for an IC",
                key_length,
                key_length - ics.len(),
                key_length
            );
        }

        report.scores.push(KeyLengthScore {
            key_length,
            average_ic: ics.iter().sum::<f64>() / ics.len() as f64,
            columns_used: ics.len(),
        });
    }

    Ok(report)
}

/// IC of a whole text, with the alphabet it actually uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextIc {
    pub ic: f64,
    /// Distinct byte values present
    pub alphabet_used: usize,
    /// `ic * alphabet_used`, about 1.0 for uniformly random text
    pub normalized: f64,
}

/// Byte-wise index of coincidence of an entire buffer
pub fn text_ic(bytes: &[u8]) -> Result<TextIc> {
    let ic = column_ic(bytes).ok_or(AnalysisError::DivisionByZero(
        "index of coincidence needs at least two bytes",
    ))?;

    let mut used = [false; MAX_ALPHABET];
    for &b in bytes {
        used[b as usize] = true;
    }
    let alphabet_used = used.iter().filter(|&&u| u).count();

    Ok(TextIc {
        ic,
        alphabet_used,
        normalized: ic * alphabet_used as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ic() {
        assert_eq!(column_ic(b"AAAA"), Some(1.0));
        assert_eq!(column_ic(b"ABCD"), Some(0.0));
        // AAB: 2*1 / (3*2)
        assert_eq!(column_ic(b"AAB"), Some(1.0 / 3.0));
        assert_eq!(column_ic(b"A"), None);
        assert_eq!(column_ic(b""), None);
    }

    #[test]
    fn test_alternating_text_prefers_even_lengths() {
        let text = b"AB".repeat(50);
        let report = estimate_key_length(&text, 2..=6).unwrap();

        let ic = |l| report.get(l).unwrap().average_ic;
        assert_eq!(ic(2), 1.0);
        assert!(ic(2) > ic(3));
        assert!(ic(2) > ic(5));
        // 4 and 6 are multiples and score as well as 2, the tie goes to 2
        assert_eq!(report.best().unwrap().key_length, 2);
    }

    #[test]
    fn test_short_columns_are_excluded() {
        // length 3 text, key length 5: columns 3 and 4 are empty, 0..2 have one byte
        let report = estimate_key_length(b"AAA", 1..=5).unwrap();
        assert_eq!(report.get(1).unwrap().average_ic, 1.0);
        assert!(report.get(2).is_some());
        assert_eq!(report.get(2).unwrap().columns_used, 1);
        assert!(report.get(3).is_none());
        assert!(report.get(5).is_none());
        for score in &report.scores {
            assert!(score.average_ic.is_finite());
        }
    }

    #[test]
    fn test_wide_range_on_short_text() {
        let text: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();
        let report = estimate_key_length(&text, 1..=usize::MAX).unwrap();
        assert_eq!(report.scores.len(), 999);
        assert_eq!(report.scores.last().unwrap().key_length, 999);
        assert_eq!(report.get(999).unwrap().columns_used, 1);

        assert!(estimate_key_length(b"", 1..=usize::MAX).unwrap().scores.is_empty());
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            estimate_key_length(b"abc", 0..=3),
            Err(AnalysisError::InvalidKeyLength(_))
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 5..=2;
        assert!(matches!(
            estimate_key_length(b"abc", reversed),
            Err(AnalysisError::InvalidKeyLength(_))
        ));
    }

    #[test]
    fn test_empty_report_has_no_best() {
        let report = estimate_key_length(b"", 1..=3).unwrap();
        assert!(report.scores.is_empty());
        assert!(report.best().is_none());
    }

    #[test]
    fn test_text_ic() {
        let uniform: Vec<u8> = (0..=255).collect();
        let t = text_ic(&uniform).unwrap();
        assert_eq!(t.ic, 0.0);
        assert_eq!(t.alphabet_used, 256);

        let t = text_ic(b"aabb").unwrap();
        // 2*(2*1) / (4*3)
        assert!((t.ic - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(t.alphabet_used, 2);
        assert!((t.normalized - 2.0 / 3.0).abs() < 1e-12);

        assert!(matches!(text_ic(b"a"), Err(AnalysisError::DivisionByZero(_))));
    }
}
