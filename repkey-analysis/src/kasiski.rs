//! Kasiski examination: distances between repeated substrings
//!
//! The same plaintext fragment enciphered at the same key phase produces the
//! same ciphertext, so recurrence distances of repeated substrings tend to be
//! multiples of the key length.

use crate::error::{AnalysisError, Result};
use crate::monitor::{SearchMonitor, Silent};
use crate::utils::gcd;

/// One substring and the gaps between its successive recurrences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatRecord {
    pub start_offset: usize,
    pub substring_length: usize,
    /// Gap from the start offset to the first recurrence, then from each
    /// recurrence to the next
    pub distances: Vec<usize>,
}

impl RepeatRecord {
    /// The repeated bytes, taken from the examined ciphertext
    pub fn substring<'a>(&self, ciphertext: &'a [u8]) -> &'a [u8] {
        &ciphertext[self.start_offset..self.start_offset + self.substring_length]
    }

    /// Absolute offsets of the start and every recurrence
    pub fn offsets(&self) -> Vec<usize> {
        let mut offsets = vec![self.start_offset];
        let mut at = self.start_offset;
        for d in &self.distances {
            at += d;
            offsets.push(at);
        }
        offsets
    }
}

/// All repeat records of one scan
#[derive(Debug, Clone, Default)]
pub struct KasiskiReport {
    pub records: Vec<RepeatRecord>,
    /// False when a monitor stopped the scan early
    pub completed: bool,
}

impl KasiskiReport {
    /// GCD of every reported distance, `None` without any
    pub fn distance_gcd(&self) -> Option<usize> {
        let g = self
            .records
            .iter()
            .flat_map(|r| r.distances.iter())
            .fold(0, |acc, &d| gcd(acc, d));
        (g != 0).then_some(g)
    }

    /// For each length in `2..=max_length`, how many distances it divides.
    ///
    /// Sorted by support, most first, then by length.
    pub fn length_tally(&self, max_length: usize) -> Vec<(usize, usize)> {
        let distances: Vec<usize> = self
            .records
            .iter()
            .flat_map(|r| r.distances.iter().copied())
            .collect();

        let mut tally: Vec<(usize, usize)> = (2..=max_length)
            .map(|l| (l, distances.iter().filter(|&&d| d % l == 0).count()))
            .filter(|&(_, n)| n > 0)
            .collect();

        tally.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        tally
    }
}

/// Find every substring of `substring_length` bytes that recurs later on.
///
/// Recurrences are searched from `start + substring_length` onward and do
/// not overlap each other. A start offset without recurrences yields no
/// record. The scan is quadratic in the ciphertext length.
pub fn find_repeats(ciphertext: &[u8], substring_length: usize) -> Result<KasiskiReport> {
    find_repeats_with(ciphertext, substring_length, &Silent)
}

/// [`find_repeats`] with progress reports and cancellation between start offsets
pub fn find_repeats_with(
    ciphertext: &[u8],
    substring_length: usize,
    monitor: &dyn SearchMonitor,
) -> Result<KasiskiReport> {
    if substring_length == 0 {
        return Err(AnalysisError::InvalidKeyLength(
            "substring length must be at least 1".to_string(),
        ));
    }

    let mut report = KasiskiReport {
        records: Vec::new(),
        completed: true,
    };

    let size = ciphertext.len();
    if substring_length > size / 2 {
        return Ok(report);
    }

    let interval = monitor.interval().max(1);
    let last_start = size - substring_length;

    for i in 0..=last_start {
        if monitor.should_stop() {
            tracing::info!("Kasiski scan stopped at offset {} of {}", i, last_start);
            report.completed = false;
            break;
        }
        if i as u64 % interval == 0 && i > 0 {
            monitor.on_progress(i as u64, None);
        }

        let substring = &ciphertext[i..i + substring_length];
        let mut distances = Vec::new();
        let mut previous = i;
        let mut j = i + substring_length;

        while j <= last_start {
            if &ciphertext[j..j + substring_length] == substring {
                distances.push(j - previous);
                previous = j;
                j += substring_length;
            } else {
                j += 1;
            }
        }

        if !distances.is_empty() {
            report.records.push(RepeatRecord {
                start_offset: i,
                substring_length,
                distances,
            });
        }
    }

    tracing::debug!("{} repeat records of length {}", report.records.len(), substring_length);
    Ok(report)
}
