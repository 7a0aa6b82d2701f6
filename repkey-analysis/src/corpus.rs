//! Reference byte distributions for languages and file formats
//!
//! A [`ReferenceCorpus`] is the expected byte histogram of some kind of
//! plaintext. The built-in tables live in a registry that is filled once per
//! process; further tables can be loaded from the tab-separated histogram
//! format written by the `byteshisto` tool.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{AnalysisError, Result};
use crate::frequency::FrequencyVector;
use crate::utils::MAX_ALPHABET;

/// A named, read-only expected distribution
#[derive(Debug, Clone)]
pub struct ReferenceCorpus {
    name: String,
    vector: FrequencyVector,
}

impl ReferenceCorpus {
    /// Wrap a count table; an all-zero table cannot be compared against
    pub fn new(name: impl Into<String>, counts: Vec<u64>) -> Result<Self> {
        let vector = FrequencyVector::from_counts(counts);
        if vector.total() == 0 {
            return Err(AnalysisError::DivisionByZero("reference corpus with no counts"));
        }
        Ok(Self {
            name: name.into(),
            vector,
        })
    }

    /// Load a histogram file, see [`ReferenceCorpus::parse_counts`]
    pub fn from_count_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let corpus = Self::parse_counts(name, &text)?;
        tracing::debug!(
            "Loaded corpus {} with {} bytes",
            corpus.name,
            corpus.vector.total()
        );
        Ok(corpus)
    }

    /// Parse `value<TAB>count[<TAB>proportion]` lines.
    ///
    /// `#` comments and blank lines are ignored. Values not mentioned count 0.
    pub fn parse_counts(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut counts = vec![0u64; MAX_ALPHABET];
        let mut seen = [false; MAX_ALPHABET];

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (value, count) = match (fields.next(), fields.next()) {
                (Some(v), Some(c)) => (v, c),
                _ => {
                    return Err(AnalysisError::CorpusFormat(format!(
                        "line {}: expected value and count",
                        lineno + 1
                    )))
                }
            };

            let value: u8 = value.parse().map_err(|e| {
                AnalysisError::CorpusFormat(format!("line {}: value {:?}: {}", lineno + 1, value, e))
            })?;
            let count: u64 = count.parse().map_err(|e| {
                AnalysisError::CorpusFormat(format!("line {}: count {:?}: {}", lineno + 1, count, e))
            })?;

            if seen[value as usize] {
                return Err(AnalysisError::CorpusFormat(format!(
                    "line {}: value {} listed twice",
                    lineno + 1,
                    value
                )));
            }
            seen[value as usize] = true;
            counts[value as usize] = count;
        }

        Self::new(name, counts)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vector(&self) -> &FrequencyVector {
        &self.vector
    }

    pub fn dimension(&self) -> usize {
        self.vector.dimension()
    }
}

/// Name to corpus lookup, immutable once built
#[derive(Debug, Clone, Default)]
pub struct CorpusRegistry {
    corpora: BTreeMap<String, ReferenceCorpus>,
}

impl CorpusRegistry {
    /// Process-wide registry of the built-in tables
    pub fn builtin() -> &'static CorpusRegistry {
        static BUILTIN: OnceLock<CorpusRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = CorpusRegistry::default();
            registry.insert(builtin_table("php", &PHP_COUNTS));
            registry.insert(builtin_table("english", &ENGLISH_COUNTS));
            registry
        })
    }

    /// Add or replace a corpus under its own name
    pub fn insert(&mut self, corpus: ReferenceCorpus) {
        self.corpora.insert(corpus.name().to_string(), corpus);
    }

    pub fn get(&self, name: &str) -> Result<&ReferenceCorpus> {
        self.corpora
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownCorpus(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.corpora.keys().map(String::as_str)
    }
}

fn builtin_table(name: &str, counts: &[u64; MAX_ALPHABET]) -> ReferenceCorpus {
    // both tables have non-zero totals, checked in tests
    ReferenceCorpus {
        name: name.to_string(),
        vector: FrequencyVector::from_counts(counts.to_vec()),
    }
}

/// Byte counts over a large body of PHP source
#[rustfmt::skip]
const PHP_COUNTS: [u64; MAX_ALPHABET] = [
    56, 0, 0, 0, 0, 0, 0, 0,
    0, 621136, 548071, 0, 0, 127054, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 2, 0, 0, 0, 0, 0,
    3123392, 25305, 244473, 12657, 401123, 8595, 19836, 442267,
    316939, 315698, 58844, 21610, 193932, 141891, 250422, 199635,
    103920, 106886, 90341, 107117, 63592, 62273, 75678, 52547,
    40477, 41334, 55481, 231735, 128623, 249523, 221584, 28568,
    36028, 75354, 28089, 43516, 27413, 70139, 32110, 22891,
    24404, 43505, 9130, 11073, 40876, 27692, 40642, 81754,
    88299, 11611, 54075, 109753, 89416, 28132, 33229, 18803,
    11915, 12899, 14728, 99586, 205455, 101878, 941, 226254,
    2669, 598479, 161159, 423983, 323876, 1020634, 270813, 133997,
    281705, 605646, 17580, 74677, 432070, 256552, 500212, 525263,
    390768, 40961, 607450, 668141, 821533, 290712, 89184, 96185,
    209069, 124786, 22459, 81949, 6388, 82738, 1540, 0,
    152, 74, 38, 48, 33, 10, 8, 12,
    51, 10, 2, 9, 46, 0, 6, 10,
    5, 4, 2, 3, 116, 3, 284, 8,
    6, 6, 10, 14, 8, 23, 2, 98,
    4, 5, 4, 23, 6, 4, 4, 6,
    5, 14, 4, 4, 4, 4, 4, 4,
    101, 4, 21, 17, 54, 87, 12, 16,
    48, 27, 36, 79, 10, 53, 103, 73,
    3, 2, 87, 139, 4, 12, 2, 3,
    4, 0, 2, 0, 2, 3, 2, 2,
    692, 304, 5, 0, 0, 1, 0, 1,
    0, 1, 0, 0, 1, 20, 0, 4,
    155, 15, 422, 15, 64, 201, 25, 36,
    131, 60, 52, 91, 108, 93, 216, 72,
    89, 102, 157, 35, 24, 21, 0, 35,
    22, 14, 1, 25, 44, 5, 5, 35,
];

/// Byte counts over English prose
#[rustfmt::skip]
const ENGLISH_COUNTS: [u64; MAX_ALPHABET] = [
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 209, 2989, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    17105, 17, 276, 53, 0, 3, 13, 59,
    353, 370, 235, 26, 884, 0, 1561, 793,
    310, 228, 187, 92, 61, 51, 66, 59,
    82, 73, 384, 10, 75, 402, 86, 7,
    8, 348, 177, 344, 246, 323, 97, 296,
    86, 480, 85, 12, 175, 143, 238, 207,
    292, 4, 286, 393, 425, 149, 54, 77,
    88, 55, 6, 307, 9, 309, 1, 304,
    0, 5771, 1861, 3353, 2887, 9982, 1769, 2140,
    2663, 6190, 290, 494, 4378, 2147, 5410, 6203,
    2120, 78, 5312, 5498, 7266, 2649, 999, 928,
    292, 1106, 90, 22, 0, 22, 3, 0,
    0, 0, 0, 0, 3, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 3, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 3, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
];
