//! Summary synthesis and issue excerpting.

use crate::domain::{Domain, Language, Severity};

/// Longest issue excerpt, in characters
pub const MAX_ISSUE_CHARS: usize = 100;

/// First sentence of `text`, trimmed and cut to [`MAX_ISSUE_CHARS`].
pub fn extract_issue(text: &str) -> String {
    let first = text
        .split(|c: char| matches!(c, '।' | '|' | '.' | '?'))
        .next()
        .unwrap_or_default()
        .trim();

    first.chars().take(MAX_ISSUE_CHARS).collect()
}

/// Headline for a report, localized into `language`
pub fn summary_prefix(severity: Severity, language: Language) -> &'static str {
    match (severity.is_urgent(), language) {
        (true, Language::En) => "Urgent Action Required",
        (true, Language::Hi) => "तत्काल कार्रवाई आवश्यक",
        (true, Language::Ta) => "உடனடி நடவடிக்கை தேவை",
        (false, Language::En) => "Field Report",
        (false, Language::Hi) => "क्षेत्र रिपोर्ट",
        (false, Language::Ta) => "வயல் அறிக்கை",
    }
}

/// Everything the synthesizer reads
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub text: &'a str,
    pub severity: Severity,
    pub location: &'a str,
    pub entities: &'a [String],
    pub domain: Domain,
    pub language: Language,
}

/// Localized summary: prefix in the source language plus the untouched text
pub fn summarize_local(input: &SummaryInput<'_>) -> String {
    format!("{}: {}", summary_prefix(input.severity, input.language), input.text)
}

/// Canonical English summary.
///
/// English sources get the same shape as the local summary. Hindi and Tamil
/// sources get a synthesized sentence list built from the domain, entities,
/// location and severity.
pub fn summarize_english(input: &SummaryInput<'_>) -> String {
    let prefix = summary_prefix(input.severity, Language::En);

    if input.language == Language::En {
        return format!("{}: {}", prefix, input.text);
    }

    let mut parts = vec![prefix.to_string(), input.domain.description().to_string()];

    if !input.entities.is_empty() {
        parts.push(format!("Affected: {}", input.entities.join(", ")));
    }
    if !input.location.is_empty() {
        parts.push(format!("Location: {}", input.location));
    }
    parts.push(format!("Severity: {}", input.severity.as_str().to_uppercase()));

    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_is_first_sentence() {
        assert_eq!(extract_issue("  Pump broken. Field dry."), "Pump broken");
        assert_eq!(extract_issue("पंप टूटा है। खेत सूखा है"), "पंप टूटा है");
        assert_eq!(extract_issue("Is it rain? maybe"), "Is it rain");
    }

    #[test]
    fn test_issue_truncates_by_characters() {
        let long = "க".repeat(150);
        assert_eq!(extract_issue(&long).chars().count(), MAX_ISSUE_CHARS);
    }

    #[test]
    fn test_english_summaries() {
        let entities = vec!["pump".to_string()];
        let input = SummaryInput {
            text: "pump broken",
            severity: Severity::Low,
            location: "",
            entities: &entities,
            domain: Domain::IrrigationProblem,
            language: Language::En,
        };
        assert_eq!(summarize_local(&input), "Field Report: pump broken");
        assert_eq!(summarize_english(&input), "Field Report: pump broken");
    }

    #[test]
    fn test_synthesized_english_summary() {
        let entities = vec!["पंप".to_string(), "मोटर".to_string()];
        let input = SummaryInput {
            text: "गाँव के पास पंप और मोटर बहुत खराब",
            severity: Severity::Critical,
            location: "पास पंप",
            entities: &entities,
            domain: Domain::IrrigationProblem,
            language: Language::Hi,
        };

        assert_eq!(
            summarize_local(&input),
            "तत्काल कार्रवाई आवश्यक: गाँव के पास पंप और मोटर बहुत खराब"
        );
        assert_eq!(
            summarize_english(&input),
            "Urgent Action Required. Irrigation problem reported. Affected: पंप, मोटर. \
             Location: पास पंप. Severity: CRITICAL"
        );
    }

    #[test]
    fn test_synthesized_summary_omits_empty_clauses() {
        let input = SummaryInput {
            text: "மழை இல்லை",
            severity: Severity::Medium,
            location: "",
            entities: &[],
            domain: Domain::WaterStress,
            language: Language::Ta,
        };
        assert_eq!(
            summarize_english(&input),
            "Field Report. Water stress reported. Severity: MEDIUM"
        );
    }
}
