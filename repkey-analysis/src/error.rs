//! Error types for ciphertext analysis

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vectors not of same dimension: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error("Invalid key specification: {0}")]
    InvalidKeySpec(String),

    #[error("Known text of {fragment} bytes must be longer than the key length {key_length}")]
    FragmentTooShort { fragment: usize, key_length: usize },

    #[error("Value {value} outside alphabet of size {alphabet}")]
    ValueOutOfRange { value: u8, alphabet: usize },

    #[error("Invalid alphabet size {0} (must be 1..=256)")]
    InvalidAlphabet(usize),

    #[error("Invalid key length: {0}")]
    InvalidKeyLength(String),

    #[error("Unknown reference corpus {0:?}")]
    UnknownCorpus(String),

    #[error("Malformed count table: {0}")]
    CorpusFormat(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
