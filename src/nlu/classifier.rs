//! Keyword-heuristic domain classification.

use tracing::debug;

use crate::domain::{Domain, DomainClassification};

/// Score awarded when no keyword matches at all
const FALLBACK_SCORE: usize = 1;

/// Hits needed for full confidence
const FULL_CONFIDENCE_HITS: f64 = 5.0;

/// Count the keywords of `domain` present in already-lowercased text.
///
/// Every keyword, in any of the three languages, contributes one point when
/// it occurs as a substring.
pub fn score_domain(normalized: &str, domain: Domain) -> usize {
    domain
        .keywords()
        .all()
        .filter(|keyword| normalized.contains(keyword))
        .count()
}

/// Classify a transcript into one of the six incident domains.
///
/// Domains are visited in canonical order and the leader only changes on a
/// strictly greater score, so ties go to the domain enumerated first. With
/// no hits at all the result is `CropDisease` scored as a single hit.
pub fn classify_domain(text: &str) -> DomainClassification {
    let normalized = text.to_lowercase();
    let scores: Vec<(Domain, usize)> = Domain::ALL
        .into_iter()
        .map(|domain| (domain, score_domain(&normalized, domain)))
        .collect();

    let mut best = (Domain::CropDisease, 0);
    for &(domain, score) in &scores {
        if score > best.1 {
            best = (domain, score);
        }
    }

    if best.1 == 0 {
        best = (Domain::CropDisease, FALLBACK_SCORE);
    }

    let confidence = (best.1 as f64 / FULL_CONFIDENCE_HITS).min(1.0);
    debug!(domain = %best.0, confidence, ?scores, "Domain classified");

    DomainClassification {
        domain: best.0,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hits_defaults_to_crop_disease() {
        let result = classify_domain("hello there");
        assert_eq!(result.domain, Domain::CropDisease);
        assert!((result.confidence - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tie_goes_to_first_enumerated() {
        // one pest keyword, one water keyword
        let result = classify_domain("locust water");
        assert_eq!(result.domain, Domain::PestOutbreak);

        // one soil keyword, one irrigation keyword
        let result = classify_domain("barren canal");
        assert_eq!(result.domain, Domain::SoilIssue);
    }

    #[test]
    fn test_confidence_caps_at_one() {
        let result = classify_domain("pest insect locust caterpillar infestation attack damage");
        assert_eq!(result.domain, Domain::PestOutbreak);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify_domain("STORM and HAIL").domain, Domain::WeatherAlert);
    }

    #[test]
    fn test_hindi_and_tamil_keywords() {
        assert_eq!(classify_domain("पंप टूटा है").domain, Domain::IrrigationProblem);
        assert_eq!(classify_domain("வறட்சி மழை இல்லை").domain, Domain::WaterStress);
    }
}
