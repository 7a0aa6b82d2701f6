//! Per-position candidate sets and their mixed-radix enumeration

use num_bigint::BigUint;
use num_traits::One;

use super::CandidateKey;
use crate::error::{AnalysisError, Result};
use crate::utils::parse_slash_list;

/// Candidate values for one key position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDigit {
    values: Vec<u8>,
}

impl KeyDigit {
    pub fn new(values: Vec<u8>) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalysisError::InvalidKeySpec(
                "empty candidate set for a key position".to_string(),
            ));
        }
        Ok(Self { values })
    }

    /// Parse a slash-separated list such as `"101/127/134"`
    pub fn parse(spec: &str) -> Result<Self> {
        Self::new(parse_slash_list(spec)?)
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn radix(&self) -> usize {
        self.values.len()
    }
}

/// Every combination of one value per key position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    digits: Vec<KeyDigit>,
}

impl KeySpace {
    pub fn new(digits: Vec<KeyDigit>) -> Result<Self> {
        if digits.is_empty() {
            return Err(AnalysisError::InvalidKeySpec(
                "key needs at least one position".to_string(),
            ));
        }
        Ok(Self { digits })
    }

    /// One slash-separated list per key position
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        let digits = specs
            .iter()
            .map(|s| KeyDigit::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(digits)
    }

    pub fn digits(&self) -> &[KeyDigit] {
        &self.digits
    }

    pub fn key_length(&self) -> usize {
        self.digits.len()
    }

    /// Product of all set sizes, exact however large
    pub fn combination_count(&self) -> BigUint {
        self.digits
            .iter()
            .fold(BigUint::one(), |acc, d| acc * BigUint::from(d.radix()))
    }

    /// The `index`-th combination in enumeration order, `None` past the end.
    ///
    /// The last position is the least significant digit.
    pub fn combination(&self, index: u64) -> Option<CandidateKey> {
        let mut rest = index;
        let mut key = vec![0u8; self.digits.len()];

        for (slot, digit) in key.iter_mut().zip(&self.digits).rev() {
            let radix = digit.radix() as u64;
            *slot = digit.values[(rest % radix) as usize];
            rest /= radix;
        }

        (rest == 0).then(|| CandidateKey::new(key))
    }

    /// Walk every combination once, last position fastest
    pub fn iter(&self) -> Odometer<'_> {
        Odometer {
            space: self,
            cursors: vec![0; self.digits.len()],
            done: false,
        }
    }
}

impl<'a> IntoIterator for &'a KeySpace {
    type Item = CandidateKey;
    type IntoIter = Odometer<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Finite odometer over a [`KeySpace`].
///
/// The cursors belong to the iterator; a fresh `iter()` starts over.
#[derive(Debug, Clone)]
pub struct Odometer<'a> {
    space: &'a KeySpace,
    cursors: Vec<usize>,
    done: bool,
}

impl Odometer<'_> {
    /// Advance the cursors; true once the first position wraps
    fn advance(&mut self) -> bool {
        for (cursor, digit) in self.cursors.iter_mut().zip(&self.space.digits).rev() {
            *cursor += 1;
            if *cursor < digit.radix() {
                return false;
            }
            *cursor = 0;
        }
        true
    }
}

impl Iterator for Odometer<'_> {
    type Item = CandidateKey;

    fn next(&mut self) -> Option<CandidateKey> {
        if self.done {
            return None;
        }

        let key = self
            .cursors
            .iter()
            .zip(&self.space.digits)
            .map(|(&c, d)| d.values[c])
            .collect();

        self.done = self.advance();
        Some(CandidateKey::new(key))
    }
}
