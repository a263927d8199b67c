//! Domain-restricted entity extraction.

use crate::domain::report::dedup_terms;
use crate::domain::Domain;

/// Pull the crops, pests and equipment named in `text` using only the
/// pattern set of `domain`. Matches are lowercased and deduplicated in
/// first-seen order.
pub fn extract_entities(text: &str, domain: Domain) -> Vec<String> {
    let normalized = text.to_lowercase();
    let haystack = normalized.as_str();
    let matches = domain.entity_patterns().iter().flat_map(move |pattern| {
        pattern
            .find_iter(haystack)
            .map(|m| m.as_str().to_string())
    });

    dedup_terms(matches)
}
