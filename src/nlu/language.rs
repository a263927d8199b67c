//! Script-based language detection.

use crate::domain::Language;

const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';
const TAMIL: std::ops::RangeInclusive<char> = '\u{0B80}'..='\u{0BFF}';

/// Infer the source language from the Unicode scripts present in `text`.
///
/// Any Devanagari character means Hindi, otherwise any Tamil character means
/// Tamil, otherwise English.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| DEVANAGARI.contains(&c)) {
        Language::Hi
    } else if text.chars().any(|c| TAMIL.contains(&c)) {
        Language::Ta
    } else {
        Language::En
    }
}
