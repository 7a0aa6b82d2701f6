//! Greedy per-column key search
//!
//! Every key column is a simple shift cipher on its own. For each column the
//! search tries every offset of the alphabet, scores the decoded column and
//! keeps the best few; columns are ranked independently of each other.

use std::cmp::Ordering;

use super::CandidateKey;
use crate::corpus::ReferenceCorpus;
use crate::error::{AnalysisError, Result};
use crate::frequency::{FrequencyVector, Metric};
use crate::utils::{format_slash_list, is_plausible, split_columns, Alphabet};

/// Offsets kept per column unless configured otherwise
pub const DEFAULT_TOP_K: usize = 4;

/// How a decoded column is judged
#[derive(Debug, Clone, Copy)]
pub enum ColumnScorer<'a> {
    /// Count of printable bytes, tab, newline and carriage return; higher wins
    Plausible,
    /// Distance to a reference distribution; lower wins
    Similarity {
        metric: Metric,
        corpus: &'a ReferenceCorpus,
    },
}

impl ColumnScorer<'_> {
    fn score(&self, decoded: &[u8]) -> Result<f64> {
        match self {
            ColumnScorer::Plausible => Ok(decoded.iter().filter(|&&b| is_plausible(b)).count() as f64),
            ColumnScorer::Similarity { metric, corpus } => {
                let mut counts = vec![0u64; corpus.dimension()];
                for &b in decoded {
                    counts[b as usize] += 1;
                }
                metric.score(&FrequencyVector::from_counts(counts), corpus.vector())
            }
        }
    }

    /// Better candidates first, the smaller offset on equal scores
    fn compare(&self, a: &ColumnCandidate, b: &ColumnCandidate) -> Ordering {
        let by_score = match self {
            ColumnScorer::Plausible => b.score.total_cmp(&a.score),
            ColumnScorer::Similarity { .. } => a.score.total_cmp(&b.score),
        };
        by_score.then(a.offset.cmp(&b.offset))
    }
}

/// One offset tried on a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnCandidate {
    pub offset: u8,
    pub score: f64,
}

/// Best offsets for one key column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRanking {
    pub column: usize,
    /// Bytes of ciphertext in this column
    pub length: usize,
    pub candidates: Vec<ColumnCandidate>,
}

impl ColumnRanking {
    /// Retained offsets as `"a/b/c"`, usable as an exhaustive-search position
    pub fn candidate_spec(&self) -> String {
        let offsets: Vec<u8> = self.candidates.iter().map(|c| c.offset).collect();
        format_slash_list(&offsets)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GreedyReport {
    pub columns: Vec<ColumnRanking>,
    /// Key `r` takes the rank-`r` offset of every column
    pub keys: Vec<CandidateKey>,
}

/// Greedy search configuration
#[derive(Debug, Clone)]
pub struct GreedySearch<'a> {
    key_length: usize,
    alphabet: Alphabet,
    top_k: usize,
    scorer: ColumnScorer<'a>,
}

impl<'a> GreedySearch<'a> {
    pub fn new(key_length: usize, alphabet: Alphabet) -> Self {
        Self {
            key_length,
            alphabet,
            top_k: DEFAULT_TOP_K,
            scorer: ColumnScorer::Plausible,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_scorer(mut self, scorer: ColumnScorer<'a>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Rank every offset of every column of `ciphertext`.
    ///
    /// A column decodes as `(c - offset) mod alphabet`.
    pub fn run(&self, ciphertext: &[u8]) -> Result<GreedyReport> {
        if self.key_length == 0 || self.key_length > ciphertext.len() {
            return Err(AnalysisError::InvalidKeyLength(format!(
                "key length {} for {} bytes of ciphertext",
                self.key_length,
                ciphertext.len()
            )));
        }
        if let ColumnScorer::Similarity { corpus, .. } = self.scorer {
            if corpus.dimension() < self.alphabet.size() {
                return Err(AnalysisError::DimensionMismatch {
                    left: self.alphabet.size(),
                    right: corpus.dimension(),
                });
            }
        }

        let columns = split_columns(ciphertext, self.key_length);
        tracing::debug!(
            "{} columns of about {} bytes",
            self.key_length,
            ciphertext.len() / self.key_length
        );

        let mut rankings = Vec::with_capacity(columns.len());
        let mut decoded = Vec::new();

        for (index, column) in columns.iter().enumerate() {
            let mut candidates = Vec::with_capacity(self.alphabet.size());

            for offset in 0..self.alphabet.size() {
                let offset = offset as u8;
                decoded.clear();
                decoded.extend(column.iter().map(|&c| self.alphabet.sub(c, offset)));
                candidates.push(ColumnCandidate {
                    offset,
                    score: self.scorer.score(&decoded)?,
                });
            }

            candidates.sort_by(|a, b| self.scorer.compare(a, b));
            candidates.truncate(self.top_k);

            rankings.push(ColumnRanking {
                column: index,
                length: column.len(),
                candidates,
            });
        }

        let ranks = rankings
            .iter()
            .map(|r| r.candidates.len())
            .min()
            .unwrap_or(0);
        let keys = (0..ranks)
            .map(|rank| {
                rankings
                    .iter()
                    .map(|r| r.candidates[rank].offset)
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect();

        Ok(GreedyReport {
            columns: rankings,
            keys,
        })
    }
}
