//! Key byte search
//!
//! Two strategies: a greedy pass that ranks every offset for each key column
//! on its own, and an exhaustive walk over explicit per-position candidate
//! sets that scores every whole key against a reference corpus.

pub mod exhaustive;
pub mod greedy;
pub mod keyspace;

pub use exhaustive::{ExhaustiveSearch, SearchOutcome};
pub use greedy::{ColumnCandidate, ColumnRanking, ColumnScorer, GreedyReport, GreedySearch};
pub use keyspace::{KeyDigit, KeySpace, Odometer};

use std::cmp::Ordering;
use std::fmt;

use crate::utils::{format_slash_list, is_plausible};

/// One byte or offset per key position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey(Vec<u8>);

impl CandidateKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every key byte is printable text
    pub fn is_printable(&self) -> bool {
        self.0.iter().all(|&b| is_plausible(b))
    }

    /// `"101/127/134"` form
    pub fn slash_list(&self) -> String {
        format_slash_list(&self.0)
    }
}

impl From<Vec<u8>> for CandidateKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for CandidateKey {
    /// Space-separated decimal values
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for b in &self.0 {
            write!(f, "{}{}", sep, b)?;
            sep = " ";
        }
        Ok(())
    }
}

/// A key and its similarity score, lower is better
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredKey {
    pub key: CandidateKey,
    pub score: f64,
}

impl ScoredKey {
    /// Ascending by score; equal scores compare equal so stable sorts keep
    /// their discovery order
    pub fn ascending(a: &ScoredKey, b: &ScoredKey) -> Ordering {
        a.score.total_cmp(&b.score)
    }
}
