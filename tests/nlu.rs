//! NLU Integration Tests
//!
//! End-to-end interpretation of field transcripts in all three languages.

use gramsense::domain::{Domain, Language, Severity};
use gramsense::nlu::{classify_domain, detect_language, extract_nlu, score_domain};

#[test]
fn test_hindi_irrigation_report() {
    let text = "पंप टूटा है, नहर में रिसाव";
    let language = detect_language(text);
    let classification = classify_domain(text);
    let nlu = extract_nlu(text, language, classification.domain);

    assert_eq!(language, Language::Hi);
    assert_eq!(classification.domain, Domain::IrrigationProblem);
    assert!((classification.confidence - 0.8).abs() < 1e-9);
    assert_eq!(nlu.severity, Severity::Low);
    assert_eq!(nlu.entities, vec!["पंप", "नहर", "रिसाव"]);
    assert_eq!(nlu.location, "में रिसाव");
    assert_eq!(nlu.summary_local, format!("क्षेत्र रिपोर्ट: {}", text));
    assert_eq!(
        nlu.summary_en,
        "Field Report. Irrigation problem reported. Affected: पंप, नहर, रिसाव. \
         Location: में रिसाव. Severity: LOW"
    );
}

#[test]
fn test_tamil_pest_report() {
    let text = "நெல் வயலில் பூச்சி தாக்குதல் மிக அதிகம்";
    let language = detect_language(text);
    let domain = classify_domain(text).domain;
    let nlu = extract_nlu(text, language, domain);

    assert_eq!(language, Language::Ta);
    assert_eq!(domain, Domain::PestOutbreak);
    assert_eq!(nlu.severity, Severity::High);
    assert_eq!(nlu.entities, vec!["நெல்", "பூச்சி"]);
    assert!(nlu.location.is_empty());
    assert!(nlu.summary_local.starts_with("உடனடி நடவடிக்கை தேவை: "));
    assert!(nlu.summary_en.starts_with("Urgent Action Required. Pest outbreak detected"));
    assert!(nlu.summary_en.ends_with("Severity: HIGH"));
}

#[test]
fn test_unmatched_text_defaults() {
    let text = "hello there";
    let classification = classify_domain(text);
    let nlu = extract_nlu(text, Language::En, classification.domain);

    assert_eq!(classification.domain, Domain::CropDisease);
    assert!((classification.confidence - 0.2).abs() < 1e-9);
    assert_eq!(nlu.severity, Severity::Low);
    assert!(nlu.entities.is_empty());
    assert!(nlu.location.is_empty());
    assert_eq!(nlu.summary_en, "Field Report: hello there");
}

#[test]
fn test_classification_is_case_insensitive() {
    assert_eq!(
        classify_domain("DROUGHT and WATER shortage").domain,
        Domain::WaterStress
    );
    assert_eq!(score_domain("drought and water shortage", Domain::WaterStress), 3);
}

#[test]
fn test_entities_are_unique_and_lowercase() {
    let text = "Pump pump PUMP broke, motor and pump again";
    let nlu = extract_nlu(text, Language::En, Domain::IrrigationProblem);
    assert_eq!(nlu.entities, vec!["pump", "motor"]);
}

#[test]
fn test_severity_is_monotone_in_markers() {
    let base = "leaf spots on the wheat";
    let medium = format!("{} problem", base);
    let high = format!("{} very serious problem", base);
    let critical = format!("{} urgent very serious problem", base);

    let severity = |t: &str| extract_nlu(t, Language::En, Domain::CropDisease).severity;
    assert_eq!(severity(base), Severity::Low);
    assert_eq!(severity(&medium), Severity::Medium);
    assert_eq!(severity(&high), Severity::High);
    assert_eq!(severity(&critical), Severity::Critical);
}
