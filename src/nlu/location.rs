//! Locative phrase extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Language;

/// A locative preposition in any supported language followed by one to
/// three tokens free of whitespace, commas and full stops.
static LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:near|at|in|पास|में|அருகில்|இல்)\s+[^\s,.]+(?:\s+[^\s,.]+){0,2}")
        .expect("location pattern is a valid regex")
});

/// Return the first locative phrase in `text`, or an empty string.
///
/// The same pattern serves all three languages, so `_language` is accepted
/// for symmetry with the other extractors.
pub fn extract_location(text: &str, _language: Language) -> String {
    LOCATION_PATTERN
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_preposition() {
        assert_eq!(
            extract_location("pests attacking the crop near Salem", Language::En),
            "near Salem"
        );
    }

    #[test]
    fn test_stops_at_punctuation_and_three_tokens() {
        assert_eq!(
            extract_location("the canal near Old Mill Road Junction is dry", Language::En),
            "near Old Mill Road"
        );
        assert_eq!(
            extract_location("leak near Erode, very bad", Language::En),
            "near Erode"
        );
    }

    #[test]
    fn test_preserves_original_casing() {
        assert_eq!(extract_location("Storm AT Madurai", Language::En), "AT Madurai");
    }

    #[test]
    fn test_no_location() {
        assert_eq!(extract_location("the pump is broken", Language::En), "");
    }
}
