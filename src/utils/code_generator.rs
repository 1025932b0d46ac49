//! Short code generation and validation utilities.
//!
//! Provides unbiased random code generation over a configurable alphabet and
//! validation for custom user-provided codes.

use crate::error::ShortenError;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Alphanumeric alphabet without look-alike symbols (`0 O 1 l I o`).
pub const DEFAULT_ALPHABET: &str = "23456789abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// Default generated code length (56 symbols ^ 7 ≈ 40.6 bits).
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Minimum entropy of a generated code, in bits.
pub const MIN_ENTROPY_BITS: f64 = 36.0;

/// Reserved codes that cannot be used as short links.
///
/// These collide with the front-end's own routes.
const RESERVED_CODES: &[&str] = &["api", "health"];

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").unwrap());

/// Errors raised while building a [`CodeAlphabet`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AlphabetError {
    #[error("alphabet must contain only ASCII letters and digits")]
    NonAlphanumeric,

    #[error("alphabet contains duplicate symbol '{0}'")]
    Duplicate(char),

    #[error("alphabet must contain at least 2 symbols")]
    TooSmall,

    #[error(
        "codes of length {length} carry {bits:.1} bits of entropy, need at least {}",
        MIN_ENTROPY_BITS
    )]
    InsufficientEntropy { length: usize, bits: f64 },
}

/// A validated symbol set and code length for generated codes.
#[derive(Debug, Clone)]
pub struct CodeAlphabet {
    symbols: Vec<char>,
    length: usize,
}

impl CodeAlphabet {
    /// Validates `symbols` and `length`.
    ///
    /// # Errors
    ///
    /// Returns [`AlphabetError`] when the alphabet has non-alphanumeric or
    /// duplicate symbols, or when the resulting entropy is below
    /// [`MIN_ENTROPY_BITS`].
    pub fn new(symbols: &str, length: usize) -> Result<Self, AlphabetError> {
        let mut chars: Vec<char> = Vec::with_capacity(symbols.len());
        for c in symbols.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(AlphabetError::NonAlphanumeric);
            }
            if chars.contains(&c) {
                return Err(AlphabetError::Duplicate(c));
            }
            chars.push(c);
        }

        if chars.len() < 2 {
            return Err(AlphabetError::TooSmall);
        }

        let bits = length as f64 * (chars.len() as f64).log2();
        if bits < MIN_ENTROPY_BITS {
            return Err(AlphabetError::InsufficientEntropy { length, bits });
        }

        Ok(Self {
            symbols: chars,
            length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn entropy_bits(&self) -> f64 {
        self.length as f64 * (self.symbols.len() as f64).log2()
    }

    /// Generates a random code.
    ///
    /// Uses the thread-local CSPRNG; `random_range` samples each symbol
    /// without modulo bias.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| self.symbols[rng.random_range(0..self.symbols.len())])
            .collect()
    }
}

impl Default for CodeAlphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`ShortenError::InvalidShortCode`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), ShortenError> {
    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(ShortenError::InvalidShortCode(format!(
            "'{}' must be 3-32 characters of letters, digits, '-' or '_'",
            code
        )));
    }

    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(ShortenError::InvalidShortCode(format!(
            "'{}' is reserved",
            code
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_alphabet_meets_entropy_floor() {
        let alphabet = CodeAlphabet::new(DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH).unwrap();
        assert!(alphabet.entropy_bits() >= MIN_ENTROPY_BITS);
        assert_eq!(alphabet.length(), 7);
    }

    #[test]
    fn test_default_alphabet_has_no_lookalikes() {
        for c in ['0', 'O', '1', 'l', 'I', 'o'] {
            assert!(!DEFAULT_ALPHABET.contains(c), "contains '{}'", c);
        }
    }

    #[test]
    fn test_generate_code_has_correct_length() {
        let alphabet = CodeAlphabet::default();
        assert_eq!(alphabet.generate().len(), DEFAULT_CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_uses_alphabet_only() {
        let alphabet = CodeAlphabet::default();
        for _ in 0..100 {
            assert!(alphabet.generate().chars().all(|c| DEFAULT_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let alphabet = CodeAlphabet::default();
        let codes: HashSet<String> = (0..1000).map(|_| alphabet.generate()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_short_code_rejected_for_low_entropy() {
        let err = CodeAlphabet::new(DEFAULT_ALPHABET, 6).unwrap_err();
        assert!(matches!(err, AlphabetError::InsufficientEntropy { length: 6, .. }));
    }

    #[test]
    fn test_alphabet_rejects_symbols() {
        assert_eq!(
            CodeAlphabet::new("abc-def", 20).unwrap_err(),
            AlphabetError::NonAlphanumeric
        );
        assert_eq!(
            CodeAlphabet::new("abca", 40).unwrap_err(),
            AlphabetError::Duplicate('a')
        );
        assert_eq!(CodeAlphabet::new("a", 64).unwrap_err(), AlphabetError::TooSmall);
    }

    #[test]
    fn test_binary_alphabet_with_long_codes() {
        let alphabet = CodeAlphabet::new("01", 36).unwrap();
        let code = alphabet.generate();
        assert_eq!(code.len(), 36);
        assert!(code.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_validate_accepts_valid_codes() {
        assert!(validate_custom_code("abc").is_ok());
        assert!(validate_custom_code("My_Link-2024").is_ok());
        assert!(validate_custom_code(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_validate_too_short() {
        let err = validate_custom_code("ab").unwrap_err();
        assert!(matches!(err, ShortenError::InvalidShortCode(_)));
        assert!(err.to_string().contains("3-32 characters"));
    }

    #[test]
    fn test_validate_too_long() {
        assert!(validate_custom_code(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_special_characters() {
        assert!(validate_custom_code("my code").is_err());
        assert!(validate_custom_code("abc/def").is_err());
        assert!(validate_custom_code("rate:x").is_err());
    }

    #[test]
    fn test_validate_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(validate_custom_code(reserved).is_err(), "{reserved}");
        }
        assert!(validate_custom_code("API").is_err());
    }
}
