//! Core orchestration logic.
//!
//! This module contains:
//! - Assembler: Transcript → interpreted, geo-tagged Report
//! - Store: Bounded local persistence with recency eviction
//! - Sync: Single-flight reconciliation with the remote collector

pub mod assembler;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use assembler::{build_report, interpret, Interpretation, ReportAssembler};
pub use store::{ReportStore, StoreError, StoreStats, MAX_REPORTS};
pub use sync::{
    AutoSync, ManualSyncResult, SyncFailure, SyncLedger, SyncReconciler, SyncReport, SyncRun,
    SyncSchedule,
};
