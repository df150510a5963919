//! Answer normalization shared by every practice mode.
//!
//! Comparison ignores all whitespace and letter case. When accents are
//! ignored, both sides are NFD-decomposed and the combining diacritical marks
//! (U+0300..=U+036F) are dropped, so "é" and "e" compare equal. Characters
//! without a decomposition such as "œ" are left alone.

use std::ops::RangeInclusive;

use icu_normalizer::{ComposingNormalizerBorrowed, DecomposingNormalizerBorrowed};

const COMBINING_DIACRITICS: RangeInclusive<char> = '\u{0300}'..='\u{036F}';

pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

pub fn strip_accents(text: &str) -> String {
    DecomposingNormalizerBorrowed::new_nfd()
        .normalize(text)
        .chars()
        .filter(|ch| !COMBINING_DIACRITICS.contains(ch))
        .collect()
}

/// Canonical composed form, applied to targets when they enter the app so that
/// typed characters line up one-to-one with target characters.
pub fn compose(text: &str) -> String {
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(text)
        .into_owned()
}

pub fn normalize(text: &str, ignore_accents: bool) -> String {
    let folded = strip_whitespace(text).to_lowercase();
    if ignore_accents {
        strip_accents(&folded)
    } else {
        folded
    }
}

pub fn answers_match(input: &str, expected: &str, ignore_accents: bool) -> bool {
    normalize(input, ignore_accents) == normalize(expected, ignore_accents)
}
