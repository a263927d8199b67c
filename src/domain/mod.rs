//! Domain types for the field reporting pipeline.
//!
//! This module contains the core data structures:
//! - Taxonomy: Language, incident Domain and Severity vocabularies
//! - Report: The persisted record plus intermediate pipeline results

pub mod report;
pub mod taxonomy;

// Re-export commonly used types
pub use report::{
    generate_report_id, DomainClassification, GeoLocation, NluResult, Report, ReportError,
    TranscriptionResult,
};
pub use taxonomy::{Domain, Language, Severity};
