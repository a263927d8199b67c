//! Ordered severity ladder.

use crate::domain::{Language, Severity};

use super::lexicon::SEVERITY_LADDER;

/// Rank a transcript into a severity tier.
///
/// Tiers are tried from critical down to medium and the first tier with a
/// marker present wins, so mixed signals resolve to the most urgent tier.
pub fn detect_severity(text: &str, language: Language) -> Severity {
    let normalized = text.to_lowercase();

    SEVERITY_LADDER
        .iter()
        .find(|(_, tier)| {
            tier.for_language(language)
                .iter()
                .any(|marker| normalized.contains(marker))
        })
        .map(|(severity, _)| *severity)
        .unwrap_or(Severity::Low)
}
