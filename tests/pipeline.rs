//! Report Assembly Integration Tests
//!
//! Speech source, geo capture and interpretation wired together.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gramsense::core::{ReportAssembler, ReportStore};
use gramsense::domain::{Domain, GeoLocation, Language, Severity, TranscriptionResult};
use gramsense::ingest::{
    AcquisitionError, CapturedSpeech, FixedGeoSource, GeoError, GeoSource, NoGeoSource,
    SpeechSource, TextSource,
};
use tokio::time::Instant;

/// Position fix that takes `delay` to arrive
struct DelayedGeo {
    delay: Duration,
}

#[async_trait]
impl GeoSource for DelayedGeo {
    async fn current_position(&self) -> Result<GeoLocation, GeoError> {
        tokio::time::sleep(self.delay).await;
        Ok(GeoLocation::new(9.93, 78.12, 15.0))
    }
}

/// Recognizer that takes `delay` and reports a language
struct DelayedSpeech {
    delay: Duration,
    text: &'static str,
    language: Option<Language>,
}

#[async_trait]
impl SpeechSource for DelayedSpeech {
    fn name(&self) -> &str {
        "delayed"
    }

    async fn acquire(&self) -> Result<CapturedSpeech, AcquisitionError> {
        tokio::time::sleep(self.delay).await;
        Ok(CapturedSpeech {
            text: self.text.to_string(),
            language_hint: self.language,
            duration_seconds: self.delay.as_secs_f64(),
        })
    }
}

struct DeniedMicrophone;

#[async_trait]
impl SpeechSource for DeniedMicrophone {
    fn name(&self) -> &str {
        "microphone"
    }

    async fn acquire(&self) -> Result<CapturedSpeech, AcquisitionError> {
        Err(AcquisitionError::Capture("permission denied".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_geo_capture_overlaps_acquisition() {
    let assembler = ReportAssembler::new(Arc::new(DelayedGeo {
        delay: Duration::from_secs(3),
    }));
    let source = DelayedSpeech {
        delay: Duration::from_secs(3),
        text: "hail storm flattened the wheat",
        language: None,
    };

    let started = Instant::now();
    let report = assembler.assemble_from(&source).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.geo_location.is_some());
    assert_eq!(report.domain, Domain::WeatherAlert);
    assert_eq!(report.audio_duration, 3.0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_geo_is_dropped_after_timeout() {
    let assembler = ReportAssembler::new(Arc::new(DelayedGeo {
        delay: Duration::from_secs(60),
    }))
    .with_geo_timeout(Duration::from_secs(10));

    let report = assembler
        .assemble_from(&TextSource::new("the motor is broken"))
        .await
        .unwrap();

    assert!(report.geo_location.is_none());
    assert_eq!(report.domain, Domain::IrrigationProblem);
}

#[tokio::test]
async fn test_language_hint_overrides_detection() {
    let assembler = ReportAssembler::new(Arc::new(NoGeoSource));
    let report = assembler
        .assemble_from(&TextSource::new("pump problem").with_language(Language::Ta))
        .await
        .unwrap();

    assert_eq!(report.language, Language::Ta);
    // Severity markers are looked up for the declared language only
    assert_eq!(report.severity, Severity::Low);
    assert!(report.summary_local.starts_with("வயல் அறிக்கை: "));
}

#[tokio::test]
async fn test_failed_acquisition_with_placeholder_fallback() {
    let assembler = ReportAssembler::new(Arc::new(FixedGeoSource::new(11.0, 77.0, 5.0)));

    let err = assembler.assemble_from(&DeniedMicrophone).await.unwrap_err();
    assert!(matches!(err, AcquisitionError::Capture(_)));

    // Placeholder substitution is an explicit caller decision
    let report = assembler
        .assemble(TranscriptionResult::placeholder(), 0.0)
        .await;
    assert_eq!(report.transcription, TranscriptionResult::PLACEHOLDER_TEXT);
    assert!(report.geo_location.is_some());
}

#[tokio::test]
async fn test_assembled_report_round_trips_through_store() {
    let assembler = ReportAssembler::new(Arc::new(FixedGeoSource::new(12.97, 77.59, 20.0)));
    let mut report = assembler
        .assemble_from(&TextSource::new("yellow spots on rice leaf, fungal rot"))
        .await
        .unwrap();
    report
        .edit_summaries("Leaf blight on paddy", "Leaf blight on paddy")
        .unwrap();

    let store = ReportStore::open_in_memory().unwrap();
    store.save(&report).await.unwrap();

    let loaded = store.get(&report.id).await.unwrap().unwrap();
    assert_eq!(loaded.domain, Domain::CropDisease);
    assert_eq!(loaded.entities, report.entities);
    assert_eq!(loaded.summary_local, "Leaf blight on paddy");
    assert_eq!(
        loaded.geo_location.map(|g| g.format_coordinates()),
        report.geo_location.map(|g| g.format_coordinates())
    );
    assert!(loaded.id.starts_with("report_"));
    assert!(!loaded.synced);
}
