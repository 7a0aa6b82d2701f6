//! Exhaustive key search over explicit candidate sets
//!
//! Each combination of the [`KeySpace`] decodes the whole ciphertext
//! (`(c + key[i mod L]) mod alphabet`), and the byte histogram of the result
//! is scored against a reference corpus.

use std::cmp::Ordering;

use num_bigint::BigUint;

use super::{CandidateKey, KeySpace, ScoredKey};
use crate::corpus::ReferenceCorpus;
use crate::error::{AnalysisError, Result};
use crate::frequency::{FrequencyVector, Metric};
use crate::monitor::SearchMonitor;
use crate::utils::Alphabet;

/// Length of the ranked table unless configured otherwise
pub const DEFAULT_TOP_N: usize = 10;

/// What an exhaustive run found
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Lowest score seen, the first one found on ties
    pub best: Option<ScoredKey>,
    /// Up to N keys, ascending by score
    pub ranked: Vec<ScoredKey>,
    pub checked: u64,
    pub total: BigUint,
    /// False when the monitor stopped the run
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct ExhaustiveSearch<'a> {
    corpus: &'a ReferenceCorpus,
    alphabet: Alphabet,
    metric: Metric,
    top_n: usize,
}

impl<'a> ExhaustiveSearch<'a> {
    pub fn new(corpus: &'a ReferenceCorpus, alphabet: Alphabet) -> Self {
        Self {
            corpus,
            alphabet,
            metric: Metric::VectorAngle,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Score one key against the corpus
    pub fn score(&self, ciphertext: &[u8], key: &CandidateKey) -> Result<f64> {
        let decoded = self.decoded_counts(ciphertext, key.bytes());
        self.metric.score(&decoded, self.corpus.vector())
    }

    /// Try every key of `space`, polling `monitor` before each one
    pub fn run(
        &self,
        ciphertext: &[u8],
        space: &KeySpace,
        monitor: &dyn SearchMonitor,
    ) -> Result<SearchOutcome> {
        if ciphertext.is_empty() {
            return Err(AnalysisError::DivisionByZero("empty ciphertext"));
        }
        if self.corpus.dimension() < self.alphabet.size() {
            return Err(AnalysisError::DimensionMismatch {
                left: self.alphabet.size(),
                right: self.corpus.dimension(),
            });
        }

        let total = space.combination_count();
        tracing::info!("Looking at {} possible keys", total);

        let interval = monitor.interval().max(1);
        let mut outcome = SearchOutcome {
            best: None,
            ranked: Vec::with_capacity(self.top_n + 1),
            checked: 0,
            total,
            completed: true,
        };

        for key in space {
            if monitor.should_stop() {
                tracing::info!("Search stopped after {} keys", outcome.checked);
                outcome.completed = false;
                break;
            }

            let score = self.score(ciphertext, &key)?;
            outcome.checked += 1;
            tracing::trace!("{}: {:.4}", key, score);

            if outcome.best.as_ref().map_or(true, |b| score < b.score) {
                outcome.best = Some(ScoredKey {
                    key: key.clone(),
                    score,
                });
            }
            self.keep_ranked(&mut outcome.ranked, ScoredKey { key, score });

            if outcome.checked % interval == 0 {
                monitor.on_progress(outcome.checked, outcome.best.as_ref().map(|b| b.score));
            }
        }

        Ok(outcome)
    }

    /// Insert after any equal score and drop whatever falls past N
    fn keep_ranked(&self, ranked: &mut Vec<ScoredKey>, scored: ScoredKey) {
        let at = ranked.partition_point(|k| ScoredKey::ascending(k, &scored) != Ordering::Greater);
        if at < self.top_n {
            ranked.insert(at, scored);
            ranked.truncate(self.top_n);
        }
    }

    fn decoded_counts(&self, ciphertext: &[u8], key: &[u8]) -> FrequencyVector {
        let mut counts = vec![0u64; self.corpus.dimension()];
        for (c, k) in ciphertext.iter().zip(key.iter().cycle()) {
            counts[self.alphabet.add(*c, *k) as usize] += 1;
        }
        FrequencyVector::from_counts(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusRegistry;
    use crate::monitor::{Silent, StopFlag};
    use crate::search::KeyDigit;
    use std::cell::RefCell;

    const PROSE: &[u8] = b"Call me Ishmael. Some years ago, never mind how long precisely, \
having little or no money in my purse, and nothing particular to interest me on shore, \
I thought I would sail about a little and see the watery part of the world. It is a way \
I have of driving off the spleen and regulating the circulation.";

    /// Ciphertext that `key` decodes back to `plain` by modular addition
    fn encode(plain: &[u8], key: &[u8], alphabet: Alphabet) -> Vec<u8> {
        plain
            .iter()
            .enumerate()
            .map(|(i, &p)| alphabet.sub(p, key[i % key.len()]))
            .collect()
    }

    fn neighbours(b: u8) -> String {
        format!("{}/{}/{}", b.wrapping_sub(1), b, b.wrapping_add(3))
    }

    #[test]
    fn test_true_key_scores_lowest() {
        let english = CorpusRegistry::builtin().get("english").unwrap();
        let key = [17u8, 200, 91];
        let alphabet = Alphabet::default();
        let cipher = encode(PROSE, &key, alphabet);
        let specs: Vec<String> = key.iter().map(|&b| neighbours(b)).collect();
        let space = KeySpace::parse(&specs).unwrap();

        let outcome = ExhaustiveSearch::new(english, alphabet)
            .run(&cipher, &space, &Silent)
            .unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.checked, 27);
        assert_eq!(outcome.total, BigUint::from(27u8));
        let best = outcome.best.unwrap();
        assert_eq!(best.key.bytes(), &key);
        assert_eq!(outcome.ranked.len(), DEFAULT_TOP_N);
        assert_eq!(outcome.ranked[0], best);
        assert!(outcome.ranked.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_chi_squared_metric() {
        let english = CorpusRegistry::builtin().get("english").unwrap();
        let key = [3u8, 1];
        let alphabet = Alphabet::default();
        let cipher = encode(PROSE, &key, alphabet);
        let space = KeySpace::parse(&[neighbours(3), neighbours(1)]).unwrap();

        let outcome = ExhaustiveSearch::new(english, alphabet)
            .with_metric(Metric::ChiSquared)
            .with_top_n(3)
            .run(&cipher, &space, &Silent)
            .unwrap();
        assert_eq!(outcome.best.unwrap().key.bytes(), &key);
        assert_eq!(outcome.ranked.len(), 3);
    }

    #[test]
    fn test_equal_scores_keep_discovery_order() {
        let flat = ReferenceCorpus::new("flat", vec![1; 4]).unwrap();
        let alphabet = Alphabet::new(4).unwrap();
        // every shift of a uniform text is uniform
        let space = KeySpace::new(vec![KeyDigit::new(vec![0, 1, 2, 3]).unwrap()]).unwrap();
        let outcome = ExhaustiveSearch::new(&flat, alphabet)
            .with_top_n(2)
            .run(&[0, 1, 2, 3], &space, &Silent)
            .unwrap();
        assert_eq!(outcome.best.unwrap().key.bytes(), &[0]);
        let order: Vec<u8> = outcome.ranked.iter().map(|k| k.key.bytes()[0]).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn test_ranked_table_interleaves_equal_and_better_scores() {
        let english = CorpusRegistry::builtin().get("english").unwrap();
        let search = ExhaustiveSearch::new(english, Alphabet::default()).with_top_n(3);
        let key = |b: u8| CandidateKey::new(vec![b]);
        let mut ranked = Vec::new();
        for (b, score) in [(1, 0.5), (2, 0.1), (3, 0.5), (4, 0.3), (5, 0.9)] {
            search.keep_ranked(&mut ranked, ScoredKey { key: key(b), score });
        }
        let order: Vec<u8> = ranked.iter().map(|k| k.key.bytes()[0]).collect();
        assert_eq!(order, vec![2, 4, 1]);
    }

    struct Recorder {
        calls: RefCell<Vec<(u64, Option<f64>)>>,
        stop_after: u64,
    }

    impl SearchMonitor for Recorder {
        fn on_progress(&self, checked: u64, best_score: Option<f64>) {
            self.calls.borrow_mut().push((checked, best_score));
        }

        fn should_stop(&self) -> bool {
            self.calls.borrow().len() as u64 >= self.stop_after
        }

        fn interval(&self) -> u64 {
            5
        }
    }

    #[test]
    fn test_progress_and_stop() {
        let english = CorpusRegistry::builtin().get("english").unwrap();
        let all: Vec<u8> = (0..=255).collect();
        let space = KeySpace::new(vec![KeyDigit::new(all).unwrap(); 2]).unwrap();
        let monitor = Recorder {
            calls: RefCell::new(Vec::new()),
            stop_after: 3,
        };

        let outcome = ExhaustiveSearch::new(english, Alphabet::default())
            .run(b"some text", &space, &monitor)
            .unwrap();

        assert!(!outcome.completed);
        assert_eq!(outcome.checked, 15);
        assert_eq!(outcome.total, BigUint::from(65536u32));
        let calls = monitor.calls.borrow();
        assert_eq!(calls.iter().map(|c| c.0).collect::<Vec<_>>(), vec![5, 10, 15]);
        assert!(calls.iter().all(|c| c.1.is_some()));
    }

    #[test]
    fn test_stop_flag_before_start() {
        let english = CorpusRegistry::builtin().get("english").unwrap();
        let flag = StopFlag::new();
        flag.stop();
        let space = KeySpace::parse(&["1/2"]).unwrap();
        let outcome = ExhaustiveSearch::new(english, Alphabet::default())
            .run(b"abc", &space, &flag)
            .unwrap();
        assert_eq!(outcome.checked, 0);
        assert!(outcome.best.is_none());
    }

    #[test]
    fn test_rejects_unusable_input() {
        let english = CorpusRegistry::builtin().get("english").unwrap();
        let space = KeySpace::parse(&["1"]).unwrap();
        let search = ExhaustiveSearch::new(english, Alphabet::default());
        assert!(matches!(
            search.run(b"", &space, &Silent),
            Err(AnalysisError::DivisionByZero(_))
        ));

        let tiny = ReferenceCorpus::new("tiny", vec![1; 8]).unwrap();
        let search = ExhaustiveSearch::new(&tiny, Alphabet::new(26).unwrap());
        assert!(matches!(
            search.run(b"abc", &space, &Silent),
            Err(AnalysisError::DimensionMismatch { left: 26, right: 8 })
        ));
    }
}
