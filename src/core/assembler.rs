//! Report assembly: the linear pipeline from transcript to stored record.
//!
//! ```text
//! acquire transcript ─┬─ detect language → classify domain → NLU → summaries ─┬─ Report
//! start geo capture ──┴──────────────────────────────────────────── await geo ─┘
//! ```
//!
//! Geo capture is started first and joined last so its latency hides behind
//! acquisition and interpretation. It never fails the pipeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    generate_report_id, DomainClassification, GeoLocation, NluResult, Report, TranscriptionResult,
};
use crate::ingest::{capture_geo_location, AcquisitionError, GeoSource, SpeechSource, DEFAULT_GEO_TIMEOUT};
use crate::nlu::{classify_domain, extract_nlu};

/// Classification plus extraction for one transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub classification: DomainClassification,
    pub nlu: NluResult,
}

/// Interpret a transcript without touching any collaborator
pub fn interpret(transcription: &TranscriptionResult) -> Interpretation {
    let classification = classify_domain(&transcription.text);
    let nlu = extract_nlu(
        &transcription.text,
        transcription.language,
        classification.domain,
    );

    Interpretation {
        classification,
        nlu,
    }
}

/// Orchestrates speech, geo and interpretation into a [`Report`]
pub struct ReportAssembler {
    geo: Arc<dyn GeoSource>,
    geo_timeout: Duration,
}

impl ReportAssembler {
    pub fn new(geo: Arc<dyn GeoSource>) -> Self {
        Self {
            geo,
            geo_timeout: DEFAULT_GEO_TIMEOUT,
        }
    }

    /// Bound on waiting for a position fix
    pub fn with_geo_timeout(mut self, timeout: Duration) -> Self {
        self.geo_timeout = timeout;
        self
    }

    fn start_geo_capture(&self) -> JoinHandle<Option<GeoLocation>> {
        let geo = Arc::clone(&self.geo);
        let timeout = self.geo_timeout;
        tokio::spawn(async move { capture_geo_location(geo.as_ref(), timeout).await })
    }

    /// Full pipeline: acquire a transcript from `source`, interpret it and
    /// assemble the report.
    ///
    /// Acquisition failures are returned as-is; substituting a placeholder
    /// transcript is the caller's decision.
    #[instrument(skip(self, source), fields(source = %source.name()))]
    pub async fn assemble_from(&self, source: &dyn SpeechSource) -> Result<Report, AcquisitionError> {
        let geo_task = self.start_geo_capture();

        let speech = match source.acquire().await {
            Ok(speech) => speech,
            Err(e) => {
                geo_task.abort();
                warn!("Transcript acquisition failed: {}", e);
                return Err(e);
            }
        };

        let audio_duration = speech.duration_seconds;
        let transcription = speech.into_transcription();
        Ok(self.finish(transcription, audio_duration, geo_task).await)
    }

    /// Pipeline for an already-acquired transcript
    pub async fn assemble(&self, transcription: TranscriptionResult, audio_duration: f64) -> Report {
        let geo_task = self.start_geo_capture();
        self.finish(transcription, audio_duration, geo_task).await
    }

    async fn finish(
        &self,
        transcription: TranscriptionResult,
        audio_duration: f64,
        geo_task: JoinHandle<Option<GeoLocation>>,
    ) -> Report {
        let interpretation = interpret(&transcription);
        debug!(
            domain = %interpretation.classification.domain,
            confidence = interpretation.classification.confidence,
            severity = %interpretation.nlu.severity,
            "Transcript interpreted"
        );

        let geo_location = match geo_task.await {
            Ok(geo) => geo,
            Err(e) => {
                warn!("Geo-location task failed: {}", e);
                None
            }
        };

        let report = build_report(transcription, audio_duration, interpretation, geo_location);
        info!(report_id = %report.id, domain = %report.domain, severity = %report.severity, "Report assembled");
        report
    }
}

/// Collapse the pipeline results into a fresh, unsynced report
pub fn build_report(
    transcription: TranscriptionResult,
    audio_duration: f64,
    interpretation: Interpretation,
    geo_location: Option<GeoLocation>,
) -> Report {
    let timestamp = Utc::now();
    let Interpretation {
        classification,
        nlu,
    } = interpretation;

    Report {
        id: generate_report_id(timestamp),
        timestamp,
        audio_duration,
        language: transcription.language,
        transcription: transcription.text,
        domain: classification.domain,
        severity: nlu.severity,
        issue: nlu.issue,
        location: nlu.location,
        geo_location,
        entities: nlu.entities,
        summary_local: nlu.summary_local,
        summary_en: nlu.summary_en,
        synced: false,
        field_worker_note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, Language, Severity};
    use crate::ingest::{FixedGeoSource, NoGeoSource, TextSource};

    #[tokio::test]
    async fn test_assemble_from_text_source() {
        let assembler = ReportAssembler::new(Arc::new(FixedGeoSource::new(11.65, 78.16, 8.0)));
        let source = TextSource::new("many pest insects attacking my tomato crop urgently near Salem");

        let report = assembler.assemble_from(&source).await.unwrap();

        assert_eq!(report.language, Language::En);
        assert_eq!(report.domain, Domain::PestOutbreak);
        assert_eq!(report.severity, Severity::Critical);
        assert_eq!(report.location, "near Salem");
        assert!(!report.synced);
        assert_eq!(report.geo_location.unwrap().latitude, 11.65);
    }

    #[tokio::test]
    async fn test_missing_geo_does_not_fail() {
        let assembler = ReportAssembler::new(Arc::new(NoGeoSource));
        let report = assembler
            .assemble(
                TranscriptionResult {
                    text: "मिट्टी खारा है".to_string(),
                    language: Language::Hi,
                    confidence: 0.8,
                },
                2.5,
            )
            .await;

        assert!(report.geo_location.is_none());
        assert_eq!(report.domain, Domain::SoilIssue);
        assert_eq!(report.audio_duration, 2.5);
        assert!(report.summary_en.starts_with("Field Report. Soil issue detected"));
    }

    #[tokio::test]
    async fn test_acquisition_failure_is_not_masked() {
        let assembler = ReportAssembler::new(Arc::new(NoGeoSource));
        let result = assembler.assemble_from(&TextSource::new("")).await;
        assert!(matches!(result, Err(AcquisitionError::NoSpeech)));
    }

    #[test]
    fn test_interpret_is_deterministic() {
        let transcription = TranscriptionResult {
            text: "storm and hail damaged the field".to_string(),
            language: Language::En,
            confidence: 0.9,
        };
        assert_eq!(interpret(&transcription), interpret(&transcription));
    }
}
