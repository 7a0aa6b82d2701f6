//! Key elimination with a probable plaintext fragment
//!
//! Combining a repeating-key ciphertext with itself shifted by the key length
//! cancels the key wherever both bytes share a key phase:
//!
//! ```text
//! C[i] - C[i+L] = (P[i] + K) - (P[i+L] + K) = P[i] - P[i+L]
//! C[i] ^ C[i+L] = (P[i] ^ K) ^ (P[i+L] ^ K) = P[i] ^ P[i+L]
//! ```
//!
//! Differencing a guessed plaintext fragment the same way gives a needle
//! that can be searched for directly; every hit yields the key bytes.

use crate::error::{AnalysisError, Result};
use crate::utils::Alphabet;

/// Needles this short match by chance too often to trust
const FALSE_POSITIVE_LENGTH: usize = 3;

/// Self-cancelling combination of a text byte with a key byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combiner {
    /// `(a - b) mod alphabet`; enciphering is `p + k`
    #[default]
    Subtract,
    /// `a ^ b`
    Xor,
}

impl Combiner {
    /// Combine two bytes of the same key phase
    pub fn combine(&self, a: u8, b: u8, alphabet: Alphabet) -> u8 {
        match self {
            Combiner::Subtract => alphabet.sub(a, b),
            Combiner::Xor => a ^ b,
        }
    }

    /// Key byte from a ciphertext byte and its plaintext
    pub fn recover(&self, cipher: u8, clear: u8, alphabet: Alphabet) -> u8 {
        match self {
            Combiner::Subtract => alphabet.sub(cipher, clear),
            Combiner::Xor => cipher ^ clear,
        }
    }

    /// Encipher `plain` under a repeating `key`
    pub fn encipher(&self, plain: &[u8], key: &[u8], alphabet: Alphabet) -> Vec<u8> {
        plain
            .iter()
            .zip(key.iter().cycle())
            .map(|(&p, &k)| match self {
                Combiner::Subtract => alphabet.add(p, k),
                Combiner::Xor => p ^ k,
            })
            .collect()
    }

    /// `X[i] ⊕ X[i + key_length]` for every `i` with a partner
    pub fn self_combine(&self, bytes: &[u8], key_length: usize, alphabet: Alphabet) -> Vec<u8> {
        bytes
            .iter()
            .zip(bytes.iter().skip(key_length))
            .map(|(&a, &b)| self.combine(a, b, alphabet))
            .collect()
    }
}

/// A place where the differenced fragment matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationMatch {
    /// Ciphertext offset where the fragment starts
    pub offset: usize,
    /// Key bytes, first byte at key phase 0
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationReport {
    /// The differenced fragment that was searched for
    pub needle: Vec<u8>,
    pub matches: Vec<EliminationMatch>,
    pub likely_false_positive: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyElimination {
    key_length: usize,
    combiner: Combiner,
    alphabet: Alphabet,
}

impl KeyElimination {
    pub fn new(key_length: usize, combiner: Combiner) -> Self {
        Self {
            key_length,
            combiner,
            alphabet: Alphabet::default(),
        }
    }

    /// Modulus for [`Combiner::Subtract`]; xor ignores it
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Find every place `fragment` could sit in `ciphertext` and the key it implies
    pub fn run(&self, ciphertext: &[u8], fragment: &[u8]) -> Result<EliminationReport> {
        let l = self.key_length;
        if l == 0 {
            return Err(AnalysisError::InvalidKeyLength(
                "key length must be at least 1".to_string(),
            ));
        }
        if fragment.len() <= l {
            return Err(AnalysisError::FragmentTooShort {
                fragment: fragment.len(),
                key_length: l,
            });
        }

        let haystack = self.combiner.self_combine(ciphertext, l, self.alphabet);
        let needle = self.combiner.self_combine(fragment, l, self.alphabet);

        let likely_false_positive = needle.len() <= FALSE_POSITIVE_LENGTH;
        if likely_false_positive {
            tracing::warn!(
                "Known text buffer is only {} bytes, may yield false positives",
                needle.len()
            );
        }

        let matches = find_all(&haystack, &needle)
            .map(|offset| EliminationMatch {
                offset,
                key: self.recover_key(ciphertext, fragment, offset),
            })
            .collect::<Vec<_>>();

        tracing::debug!("{} matches of a {} byte needle", matches.len(), needle.len());

        Ok(EliminationReport {
            needle,
            matches,
            likely_false_positive,
        })
    }

    /// Key bytes implied by the fragment sitting at `offset`, rotated to phase 0
    fn recover_key(&self, ciphertext: &[u8], fragment: &[u8], offset: usize) -> Vec<u8> {
        let l = self.key_length;
        // recovered[j] belongs to key phase (offset + j) mod l
        let mut key: Vec<u8> = ciphertext[offset..offset + l]
            .iter()
            .zip(fragment)
            .map(|(&c, &p)| self.combiner.recover(c, p, self.alphabet))
            .collect();
        key.rotate_right(offset % l);
        key
    }
}

/// Start of every occurrence of `needle`, overlapping ones included
fn find_all<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, w)| *w == needle)
        .map(|(i, _)| i)
}
