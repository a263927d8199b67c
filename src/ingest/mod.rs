//! External collaborators feeding the pipeline.
//!
//! 1. **Transcriber**: speech-to-text sources (typed text, local Whisper)
//! 2. **Geo**: position sources and the bounded capture helper
//!
//! # Architecture
//!
//! ```text
//! SpeechSource ──┐
//!                ├──→ ReportAssembler
//! GeoSource ─────┘   (geo capture runs concurrently, joined before assembly)
//! ```

pub mod geo;
pub mod transcriber;

// Re-export key types
pub use geo::{capture_geo_location, FixedGeoSource, GeoError, GeoSource, NoGeoSource, DEFAULT_GEO_TIMEOUT};
pub use transcriber::{AcquisitionError, CapturedSpeech, SpeechSource, TextSource, WhisperSource};
