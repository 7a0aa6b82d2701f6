//! Utility functions shared by the analysers

use crate::error::{AnalysisError, Result};

/// Largest alphabet a byte-valued ciphertext can use
pub const MAX_ALPHABET: usize = 256;

/// Modulus for the additive arithmetic of a cipher.
///
/// Values are integers in `[0, size)`. Byte ciphertexts use the default of 256,
/// letter-only texts might use 26.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    size: usize,
}

impl Alphabet {
    /// Create an alphabet of the given size
    ///
    /// # Example
    ///
    /// ```rust
    /// use repkey_analysis::Alphabet;
    ///
    /// let letters = Alphabet::new(26)?;
    /// assert_eq!(letters.sub(1, 3), 24);
    /// # Ok::<(), repkey_analysis::AnalysisError>(())
    /// ```
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || size > MAX_ALPHABET {
            return Err(AnalysisError::InvalidAlphabet(size));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, value: u8) -> bool {
        (value as usize) < self.size
    }

    /// `(a - b) mod size`, always non-negative
    pub fn sub(&self, a: u8, b: u8) -> u8 {
        (a as i32 - b as i32).rem_euclid(self.size as i32) as u8
    }

    /// `(a + b) mod size`
    pub fn add(&self, a: u8, b: u8) -> u8 {
        ((a as usize + b as usize) % self.size) as u8
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self { size: MAX_ALPHABET }
    }
}

/// Printable ASCII plus tab, newline and carriage return
pub fn is_plausible(b: u8) -> bool {
    b == b'\t' || b == b'\n' || b == b'\r' || (32..=127).contains(&b)
}

/// Distribute `bytes` round-robin into `key_length` columns.
///
/// Column `j` holds every byte whose index is `j mod key_length`.
pub fn split_columns(bytes: &[u8], key_length: usize) -> Vec<Vec<u8>> {
    let mut columns = vec![Vec::with_capacity(bytes.len() / key_length.max(1) + 1); key_length];

    for (i, &b) in bytes.iter().enumerate() {
        columns[i % key_length].push(b);
    }

    columns
}

/// Turn a string like `"101/127/134"` into the byte values it names.
///
/// Malformed tokens are logged and skipped; the list is only rejected when
/// nothing usable is left.
pub fn parse_slash_list(spec: &str) -> Result<Vec<u8>> {
    let mut values = Vec::new();

    for token in spec.split('/') {
        match token.trim().parse::<u8>() {
            Ok(v) => values.push(v),
            Err(e) => tracing::warn!("Problem with key byte {:?} in {:?}: {}", token, spec, e),
        }
    }

    if values.is_empty() {
        return Err(AnalysisError::InvalidKeySpec(format!(
            "no usable values in {:?}",
            spec
        )));
    }

    Ok(values)
}

/// Render bytes as a slash-separated decimal list, the inverse of [`parse_slash_list`]
pub fn format_slash_list(values: &[u8]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Greatest common divisor, `gcd(0, n) == n`
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_bounds() {
        assert!(matches!(Alphabet::new(0), Err(AnalysisError::InvalidAlphabet(0))));
        assert!(matches!(Alphabet::new(257), Err(AnalysisError::InvalidAlphabet(257))));
        assert_eq!(Alphabet::new(256).unwrap(), Alphabet::default());
    }

    #[test]
    fn test_modular_arithmetic() {
        let letters = Alphabet::new(26).unwrap();
        assert_eq!(letters.sub(0, 1), 25);
        assert_eq!(letters.add(25, 3), 2);

        let bytes = Alphabet::default();
        assert_eq!(bytes.sub(3, 250), 9);
        assert_eq!(bytes.add(250, 10), 4);
        assert!(bytes.contains(255));
        assert!(!letters.contains(26));
    }

    #[test]
    fn test_plausible_bytes() {
        assert!(is_plausible(b'a'));
        assert!(is_plausible(b'\n'));
        assert!(is_plausible(127));
        assert!(!is_plausible(0));
        assert!(!is_plausible(200));
    }

    #[test]
    fn test_split_columns() {
        let columns = split_columns(b"ABCDEFGH", 3);
        assert_eq!(columns[0], b"ADG");
        assert_eq!(columns[1], b"BEH");
        assert_eq!(columns[2], b"CF");
    }

    #[test]
    fn test_slash_list_skips_bad_tokens() {
        assert_eq!(parse_slash_list("101/127/134").unwrap(), vec![101, 127, 134]);
        assert_eq!(parse_slash_list("1/x/300/2").unwrap(), vec![1, 2]);
        assert!(matches!(
            parse_slash_list("x/y"),
            Err(AnalysisError::InvalidKeySpec(_))
        ));
        assert_eq!(format_slash_list(&[7, 8, 9]), "7/8/9");
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(20, 30), 10);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(13, 5), 1);
    }
}
