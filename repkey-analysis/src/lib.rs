//! # Repeating-Key Analysis Library
//!
//! Statistical key recovery for repeating-key byte-substitution ciphers:
//! Vigenère-style additive ciphers and their xor variants, over any alphabet
//! of up to 256 values.
//!
//! ## Tools
//!
//! - **Frequency vectors** with chi-squared and vector-angle similarity
//! - **Key length estimation** by average column index of coincidence
//! - **Kasiski examination** of repeated substrings
//! - **Key byte search**, greedy per column or exhaustive over candidate sets
//! - **Key elimination** against a probable plaintext fragment
//!
//! ## Usage
//!
//! ```rust
//! use repkey_analysis::{estimate_key_length, Combiner, KeyElimination, Alphabet};
//!
//! let plain = b"meet me by the old mill, meet me by the old mill at noon";
//! let cipher = Combiner::Subtract.encipher(plain, b"KEY", Alphabet::default());
//!
//! let lengths = estimate_key_length(&cipher, 1..=8)?;
//! assert!(lengths.get(3).is_some());
//!
//! let report = KeyElimination::new(3, Combiner::Subtract).run(&cipher, b"the old mill")?;
//! assert_eq!(report.matches[0].key, b"KEY".to_vec());
//! # Ok::<(), repkey_analysis::AnalysisError>(())
//! ```
//!
//! Every analysis is a one-shot computation over an in-memory buffer. The
//! two superlinear scans accept a [`SearchMonitor`] for progress reports and
//! cooperative cancellation.

// Public modules
pub mod corpus;
pub mod elimination;
pub mod error;
pub mod frequency;
pub mod kasiski;
pub mod keylength;
pub mod monitor;
pub mod search;
pub mod utils;

// Re-exports for easy access
pub use corpus::{CorpusRegistry, ReferenceCorpus};
pub use elimination::{Combiner, EliminationMatch, EliminationReport, KeyElimination};
pub use error::{AnalysisError, Result};
pub use frequency::{chi_squared, cosine_distance, identical_angle, FrequencyVector, Metric};
pub use kasiski::{find_repeats, find_repeats_with, KasiskiReport, RepeatRecord};
pub use keylength::{column_ic, estimate_key_length, text_ic, KeyLengthReport, KeyLengthScore, TextIc};
pub use monitor::{LogMonitor, SearchMonitor, Silent, StopFlag};
pub use search::{
    CandidateKey, ColumnScorer, ExhaustiveSearch, GreedyReport, GreedySearch, KeyDigit, KeySpace,
    ScoredKey, SearchOutcome,
};
pub use utils::{is_plausible, Alphabet};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
