//! The persisted incident report and the intermediate pipeline results that
//! collapse into it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::taxonomy::{Domain, Language, Severity};

/// Rejected mutation of a report
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Summary must not be empty: {0}")]
    EmptySummary(&'static str),
}

/// A geo-coordinate captured alongside a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,

    /// Accuracy radius in metres
    pub accuracy: f64,

    /// When the fix was taken
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            captured_at: Utc::now(),
        }
    }

    /// Render as `"lat, lon"` with six decimal places
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Output of the speech-to-text step
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: Language,
    pub confidence: f64,
}

impl TranscriptionResult {
    /// Text used by callers that choose to keep going after a failed capture.
    pub const PLACEHOLDER_TEXT: &'static str = "Unable to transcribe audio. Please try again.";

    /// Stand-in transcript for a failed acquisition. Never produced by the
    /// pipeline itself; callers opt in explicitly.
    pub fn placeholder() -> Self {
        Self {
            text: Self::PLACEHOLDER_TEXT.to_string(),
            language: Language::En,
            confidence: 0.5,
        }
    }
}

/// Winning domain and its confidence in `[0.2, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainClassification {
    pub domain: Domain,
    pub confidence: f64,
}

/// Combined output of the extraction passes
#[derive(Debug, Clone, PartialEq)]
pub struct NluResult {
    pub issue: String,
    pub severity: Severity,
    pub location: String,
    pub entities: Vec<String>,
    pub summary_local: String,
    pub summary_en: String,
}

/// The unit of record, stored locally and pushed to the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Unique for the lifetime of the store
    pub id: String,

    /// Capture instant (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Length of the source recording in seconds (0 when unknown)
    #[serde(default)]
    pub audio_duration: f64,

    pub language: Language,
    pub transcription: String,
    pub domain: Domain,
    pub severity: Severity,

    /// First sentence of the transcript, at most 100 characters
    pub issue: String,

    /// Best-effort location phrase, possibly empty
    pub location: String,

    #[serde(rename = "geoLocation", default, skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,

    /// Matched domain terms, without duplicates
    pub entities: Vec<String>,

    pub summary_local: String,
    pub summary_en: String,

    /// Flips false -> true once, when the collector accepts the report
    #[serde(default)]
    pub synced: bool,

    #[serde(rename = "fieldWorkerNote", default, skip_serializing_if = "Option::is_none")]
    pub field_worker_note: Option<String>,
}

impl Report {
    /// Replace both summaries ahead of confirmation.
    pub fn edit_summaries(
        &mut self,
        summary_local: impl Into<String>,
        summary_en: impl Into<String>,
    ) -> Result<(), ReportError> {
        let summary_local = summary_local.into();
        let summary_en = summary_en.into();

        if summary_local.trim().is_empty() {
            return Err(ReportError::EmptySummary("summary_local"));
        }
        if summary_en.trim().is_empty() {
            return Err(ReportError::EmptySummary("summary_en"));
        }

        self.summary_local = summary_local;
        self.summary_en = summary_en;
        Ok(())
    }

    /// Attach a free-text note from the field worker
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.field_worker_note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }
}

/// Generate a report id: `report_<epoch-ms>_<uuid>`
pub fn generate_report_id(timestamp: DateTime<Utc>) -> String {
    format!(
        "report_{}_{}",
        timestamp.timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Deduplicate terms keeping first-seen order
pub(crate) fn dedup_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = BTreeSet::new();
    terms
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}
