//! gramsense - Offline-first field incident reporting
//!
//! Turns a farmer's spoken or typed observation (English, Hindi or Tamil)
//! into a structured, geo-tagged incident report, keeps a bounded set of
//! recent reports on the device, and pushes them to a remote collector
//! whenever the network allows.
//!
//! # Architecture
//!
//! The pipeline is linear and deterministic:
//! - A speech source yields a transcript; its language is detected from script
//! - The transcript is classified into one of six incident domains
//! - Severity, location, entities and summaries are extracted
//! - The assembled report is persisted locally, newest ten kept
//! - A single-flight reconciler pushes unsynced reports to the collector
//!
//! # Modules
//!
//! - `nlu`: Keyword and pattern heuristics (classification, extraction)
//! - `ingest`: Speech and geo-location sources
//! - `core`: Report assembly, local store, sync
//! - `adapters`: Collector client and reachability probes
//! - `domain`: Data structures (Report, Domain, Severity, Language)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # File a report from typed text
//! gramsense report --text "many pest insects attacking my tomato crop near Salem"
//!
//! # Push pending reports
//! gramsense sync
//!
//! # Keep syncing in the background
//! gramsense watch
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ingest;
pub mod nlu;

// Re-export main types at crate root for convenience
pub use crate::core::{ReportAssembler, ReportStore, SyncReconciler};
pub use domain::{Domain, GeoLocation, Language, Report, Severity, TranscriptionResult};
pub use nlu::{classify_domain, detect_language, extract_nlu};
