//! Multilingual interpretation of field transcripts.
//!
//! Every pass here is a pure function over text:
//!
//! ```text
//! transcript → language → domain → {entities, severity, location} → summaries
//! ```
//!
//! None of them can fail; missing signals yield defaults (crop disease,
//! low severity, empty location, no entities).

pub mod classifier;
pub mod entities;
pub mod language;
pub mod lexicon;
pub mod location;
pub mod severity;
pub mod summary;

pub use classifier::{classify_domain, score_domain};
pub use entities::extract_entities;
pub use language::detect_language;
pub use location::extract_location;
pub use severity::detect_severity;
pub use summary::{extract_issue, summarize_english, summarize_local, SummaryInput};

use crate::domain::{Domain, Language, NluResult};

/// Run the extraction passes for a transcript whose domain is already known.
pub fn extract_nlu(text: &str, language: Language, domain: Domain) -> NluResult {
    let entities = extract_entities(text, domain);
    let severity = detect_severity(text, language);
    let location = extract_location(text, language);
    let issue = extract_issue(text);

    let input = SummaryInput {
        text,
        severity,
        location: &location,
        entities: &entities,
        domain,
        language,
    };
    let summary_local = summarize_local(&input);
    let summary_en = summarize_english(&input);

    NluResult {
        issue,
        severity,
        location,
        entities,
        summary_local,
        summary_en,
    }
}
