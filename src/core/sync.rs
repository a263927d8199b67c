//! Offline-first reconciliation of local reports with the remote collector.
//!
//! Each run pushes every unsynced report independently: an item that fails is
//! logged and left unsynced for the next run, and never aborts the batch.
//! Delivery is at-least-once; a report accepted by the collector but not
//! flagged locally (store failure in between) is sent again next run.
//!
//! Runs are single-flight. Triggers that overlap an in-progress run (timer,
//! reachability transition, manual request) return immediately instead of
//! submitting the same reports twice.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{Collector, Connectivity};
use crate::domain::Report;

use super::store::{ReportStore, StoreError};

/// The slice of the store the reconciler needs
#[async_trait]
pub trait SyncLedger: Send + Sync {
    async fn list_unsynced(&self) -> Result<Vec<Report>, StoreError>;
    async fn mark_synced(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl SyncLedger for ReportStore {
    async fn list_unsynced(&self) -> Result<Vec<Report>, StoreError> {
        ReportStore::list_unsynced(self).await
    }

    async fn mark_synced(&self, id: &str) -> Result<bool, StoreError> {
        ReportStore::mark_synced(self, id).await
    }
}

/// Per-item failure within a run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub report_id: String,
    pub error: String,
}

/// Tally of one completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Unsynced reports found at the start of the run
    pub attempted: usize,

    /// Reports accepted by the collector and flagged locally
    pub synced: usize,

    pub failures: Vec<SyncFailure>,
}

/// Outcome of one reconciliation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRun {
    /// Collector unreachable; nothing was read or sent
    Offline,

    /// Another run was in progress; nothing was read or sent
    AlreadyRunning,

    Completed(SyncReport),
}

impl SyncRun {
    /// Number of reports synced by this attempt
    pub fn synced_count(&self) -> usize {
        match self {
            Self::Completed(report) => report.synced,
            Self::Offline | Self::AlreadyRunning => 0,
        }
    }
}

/// User-facing result of a manual sync request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualSyncResult {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

impl ManualSyncResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            message: message.into(),
        }
    }
}

/// Pushes unsynced reports to the collector
pub struct SyncReconciler {
    ledger: Arc<dyn SyncLedger>,
    collector: Arc<dyn Collector>,
    connectivity: Arc<dyn Connectivity>,

    /// Held for the duration of a run
    run_guard: Mutex<()>,
}

impl SyncReconciler {
    pub fn new(
        ledger: Arc<dyn SyncLedger>,
        collector: Arc<dyn Collector>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            ledger,
            collector,
            connectivity,
            run_guard: Mutex::new(()),
        }
    }

    /// Whether the collector is currently reachable
    pub async fn is_online(&self) -> bool {
        self.connectivity.is_online().await
    }

    /// Run one reconciliation pass.
    ///
    /// Store failures while listing unsynced reports are propagated; every
    /// per-item failure is absorbed into the returned tally.
    #[instrument(skip(self), fields(collector = %self.collector.name()))]
    pub async fn sync_reports(&self) -> Result<SyncRun, StoreError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            debug!("Sync already in progress, skipping");
            return Ok(SyncRun::AlreadyRunning);
        };

        if !self.connectivity.is_online().await {
            info!("Offline: skipping sync");
            return Ok(SyncRun::Offline);
        }

        let unsynced = self.ledger.list_unsynced().await?;
        if unsynced.is_empty() {
            debug!("No reports to sync");
            return Ok(SyncRun::Completed(SyncReport::default()));
        }

        info!("Syncing {} reports to collector", unsynced.len());

        let mut report = SyncReport {
            attempted: unsynced.len(),
            ..Default::default()
        };

        for item in &unsynced {
            match self.push_one(item).await {
                Ok(()) => {
                    report.synced += 1;
                    info!(report_id = %item.id, "Synced report");
                }
                Err(e) => {
                    warn!(report_id = %item.id, "Failed to sync report: {}", e);
                    report.failures.push(SyncFailure {
                        report_id: item.id.clone(),
                        error: e,
                    });
                }
            }
        }

        info!(
            "Sync complete: {}/{} reports synced",
            report.synced, report.attempted
        );
        Ok(SyncRun::Completed(report))
    }

    async fn push_one(&self, report: &Report) -> Result<(), String> {
        self.collector
            .submit(report)
            .await
            .map_err(|e| e.to_string())?;

        self.ledger
            .mark_synced(&report.id)
            .await
            .map_err(|e| format!("accepted by collector but not flagged locally: {}", e))?;

        Ok(())
    }

    /// Count-only variant: reports synced by this run, 0 when offline or
    /// when another run is in flight
    pub async fn sync_count(&self) -> Result<usize, StoreError> {
        Ok(self.sync_reports().await?.synced_count())
    }

    /// Manual trigger with a user-facing outcome
    pub async fn trigger_manual_sync(&self) -> ManualSyncResult {
        match self.sync_reports().await {
            Ok(SyncRun::Offline) => ManualSyncResult::failure("Cannot sync: Device is offline"),
            Ok(SyncRun::AlreadyRunning) => ManualSyncResult::failure("Sync already in progress"),
            Ok(SyncRun::Completed(report)) => manual_result(&report),
            Err(e) => {
                error!("Manual sync failed: {}", e);
                ManualSyncResult::failure(format!("Sync failed: {}", e))
            }
        }
    }
}

fn manual_result(report: &SyncReport) -> ManualSyncResult {
    if report.attempted == 0 {
        return ManualSyncResult {
            success: true,
            count: 0,
            message: "No reports to sync".to_string(),
        };
    }

    if report.synced == 0 {
        return ManualSyncResult::failure(format!(
            "Sync failed: 0 of {} reports accepted",
            report.attempted
        ));
    }

    let mut message = format!("Successfully synced {} reports", report.synced);
    if !report.failures.is_empty() {
        message.push_str(&format!(" ({} failed)", report.failures.len()));
    }

    ManualSyncResult {
        success: true,
        count: report.synced,
        message,
    }
}

/// Timing for the automatic triggers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSchedule {
    /// Recurring sync while online
    pub interval: Duration,

    /// Delay before the startup sync
    pub initial_delay: Duration,

    /// How often reachability is re-probed to catch offline→online
    pub connectivity_poll: Duration,
}

impl Default for SyncSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            initial_delay: Duration::from_secs(2),
            connectivity_poll: Duration::from_secs(15),
        }
    }
}

/// Drives the reconciler from timers and reachability transitions
pub struct AutoSync {
    reconciler: Arc<SyncReconciler>,
    schedule: SyncSchedule,
}

impl AutoSync {
    pub fn new(reconciler: Arc<SyncReconciler>, schedule: SyncSchedule) -> Self {
        Self {
            reconciler,
            schedule,
        }
    }

    /// Run until `shutdown` resolves.
    ///
    /// Returns the total number of reports synced across all runs.
    pub async fn run<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut online = self.reconciler.is_online().await;
        let mut startup_pending = online;

        let startup = tokio::time::sleep(self.schedule.initial_delay);
        tokio::pin!(startup);

        let now = Instant::now();
        let mut periodic = interval_at(now + self.schedule.interval, self.schedule.interval);
        periodic.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll = interval_at(
            now + self.schedule.connectivity_poll,
            self.schedule.connectivity_poll,
        );
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut total = 0;
        info!(online, "Auto-sync started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Auto-sync stopping");
                    break;
                }
                _ = &mut startup, if startup_pending => {
                    startup_pending = false;
                    total += self.run_once("startup").await;
                }
                _ = periodic.tick() => {
                    if self.reconciler.is_online().await {
                        total += self.run_once("interval").await;
                    }
                }
                _ = poll.tick() => {
                    let now_online = self.reconciler.is_online().await;
                    if now_online && !online {
                        info!("Network online - triggering sync");
                        total += self.run_once("online").await;
                    }
                    online = now_online;
                }
            }
        }

        total
    }

    async fn run_once(&self, trigger: &str) -> usize {
        match self.reconciler.sync_reports().await {
            Ok(run) => {
                debug!(trigger, ?run, "Triggered sync finished");
                run.synced_count()
            }
            Err(e) => {
                error!(trigger, "Sync error: {}", e);
                0
            }
        }
    }
}
