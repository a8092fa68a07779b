//! Byte classification for the text-detection heuristic.
//!
//! Received bytes are sorted into coarse character classes. A rate is
//! considered plausible when the stream contains enough valid characters
//! with a believable mix of whitespace, punctuation and vowels.

use once_cell::sync::Lazy;

/// Whitespace bytes that count toward text detection.
pub const WHITESPACE: &[u8] = &[b' ', b'\t', b'\r', b'\n'];

/// Sentence punctuation bytes that count toward text detection.
pub const PUNCTUATION: &[u8] = &[b'.', b',', b':', b';', b'?', b'!'];

/// ASCII vowels, both cases.
pub const VOWELS: &[u8] = b"aAeEiIoOuU";

/// Lookup table of bytes considered valid text: the printable ASCII range
/// (space through `~`) plus the whitespace control characters.
///
/// Built once at startup and shared read-only across tasks.
static VALID_CHARACTERS: Lazy<[bool; 256]> = Lazy::new(|| {
    let mut table = [false; 256];
    for b in b' '..=b'~' {
        table[b as usize] = true;
    }
    for &b in WHITESPACE {
        table[b as usize] = true;
    }
    table
});

/// Classification of a single received byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Not plausible text; discards the current accumulation window.
    Invalid,
    Whitespace,
    Punctuation,
    Vowel,
    /// Printable but none of the tracked subclasses.
    OtherValid,
}

/// Classify one byte.
///
/// Total over `u8`: every byte maps to exactly one class. The whitespace,
/// punctuation and vowel sets are disjoint by construction.
pub fn classify(byte: u8) -> CharClass {
    if !VALID_CHARACTERS[byte as usize] {
        CharClass::Invalid
    } else if WHITESPACE.contains(&byte) {
        CharClass::Whitespace
    } else if PUNCTUATION.contains(&byte) {
        CharClass::Punctuation
    } else if VOWELS.contains(&byte) {
        CharClass::Vowel
    } else {
        CharClass::OtherValid
    }
}
