//! Command-line interface for gramsense.
//!
//! Provides commands for filing field reports, browsing and pruning the
//! local store, syncing with the collector and inspecting classification.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use crate::adapters::{Connectivity, HttpCollector, HttpProbe, StaticConnectivity};
use crate::config::{self, ResolvedConfig};
use crate::core::{interpret, AutoSync, ReportAssembler, ReportStore, SyncReconciler, MAX_REPORTS};
use crate::domain::{Language, Report, TranscriptionResult};
use crate::nlu::detect_language;
use crate::ingest::{FixedGeoSource, GeoSource, NoGeoSource, SpeechSource, TextSource, WhisperSource};

/// gramsense - Offline-first field incident reporting
#[derive(Parser, Debug)]
#[command(name = "gramsense")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// File a new field report from text or a recorded audio file
    Report {
        /// Transcript text
        #[arg(short, long, conflicts_with = "audio", required_unless_present = "audio")]
        text: Option<String>,

        /// Audio file to transcribe with Whisper
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Whisper model name
        #[arg(long, default_value = "base")]
        model: String,

        /// Whisper executable
        #[arg(long, env = "WHISPER_PATH")]
        whisper_bin: Option<String>,

        /// Declare the transcript language instead of detecting it
        #[arg(short, long, value_enum)]
        language: Option<LanguageArg>,

        /// Latitude of the observation
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the observation
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Position accuracy in meters
        #[arg(long, default_value = "50")]
        accuracy: f64,

        /// Replace the generated local-language summary
        #[arg(long)]
        summary_local: Option<String>,

        /// Replace the generated English summary
        #[arg(long)]
        summary_en: Option<String>,

        /// Free-text note attached to the report
        #[arg(short, long)]
        note: Option<String>,

        /// File a placeholder transcript if speech acquisition fails
        #[arg(long)]
        placeholder_on_failure: bool,
    },

    /// List stored reports, newest first
    List {
        /// Only show reports not yet synced
        #[arg(long)]
        pending: bool,
    },

    /// Show one stored report
    Show {
        /// Report ID
        report_id: String,

        /// Print the full JSON record
        #[arg(long)]
        json: bool,
    },

    /// Delete one stored report
    Delete {
        /// Report ID
        report_id: String,
    },

    /// Delete every stored report
    Clear {
        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },

    /// Show local report statistics
    Stats,

    /// Push unsynced reports to the collector
    Sync {
        /// Treat the collector as unreachable
        #[arg(long)]
        offline: bool,
    },

    /// Keep syncing on a schedule and on reconnect until interrupted
    Watch,

    /// Classify text without storing anything
    Classify {
        /// Text to interpret
        text: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Supported transcript languages
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LanguageArg {
    En,
    Hi,
    Ta,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::En,
            LanguageArg::Hi => Language::Hi,
            LanguageArg::Ta => Language::Ta,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report {
                text,
                audio,
                model,
                whisper_bin,
                language,
                lat,
                lon,
                accuracy,
                summary_local,
                summary_en,
                note,
                placeholder_on_failure,
            } => {
                let source: Box<dyn SpeechSource> = match (text, audio) {
                    (Some(text), _) => {
                        let source = TextSource::new(text);
                        Box::new(match language {
                            Some(lang) => source.with_language(lang.into()),
                            None => source,
                        })
                    }
                    (None, Some(audio)) => {
                        let source = WhisperSource::new(audio, model);
                        Box::new(match whisper_bin {
                            Some(binary) => source.with_binary(binary),
                            None => source,
                        })
                    }
                    (None, None) => anyhow::bail!("Provide --text or --audio"),
                };

                let geo: Arc<dyn GeoSource> = match (lat, lon) {
                    (Some(lat), Some(lon)) => Arc::new(FixedGeoSource::new(lat, lon, accuracy)),
                    _ => Arc::new(NoGeoSource),
                };

                file_report(
                    source.as_ref(),
                    geo,
                    ReportEdits {
                        summary_local,
                        summary_en,
                        note,
                    },
                    placeholder_on_failure,
                )
                .await
            }
            Commands::List { pending } => list_reports(pending).await,
            Commands::Show { report_id, json } => show_report(&report_id, json).await,
            Commands::Delete { report_id } => delete_report(&report_id).await,
            Commands::Clear { yes } => clear_reports(yes).await,
            Commands::Stats => show_stats().await,
            Commands::Sync { offline } => run_sync(offline).await,
            Commands::Watch => watch().await,
            Commands::Classify { text } => classify(&text),
            Commands::Config => show_config(),
        }
    }
}

/// Worker edits applied at the confirmation step
struct ReportEdits {
    summary_local: Option<String>,
    summary_en: Option<String>,
    note: Option<String>,
}

async fn file_report(
    source: &dyn SpeechSource,
    geo: Arc<dyn GeoSource>,
    edits: ReportEdits,
    placeholder_on_failure: bool,
) -> Result<()> {
    let config = config::config()?;
    let assembler = ReportAssembler::new(geo).with_geo_timeout(config.geo_timeout());

    eprintln!("🎙️  Acquiring transcript from {}...", source.name());

    let mut report = match assembler.assemble_from(source).await {
        Ok(report) => report,
        Err(e) if placeholder_on_failure => {
            eprintln!("⚠️  {} - filing placeholder transcript", e);
            assembler
                .assemble(TranscriptionResult::placeholder(), 0.0)
                .await
        }
        Err(e) => return Err(e).context("Failed to acquire transcript"),
    };

    if edits.summary_local.is_some() || edits.summary_en.is_some() {
        let summary_local = edits
            .summary_local
            .unwrap_or_else(|| report.summary_local.clone());
        let summary_en = edits.summary_en.unwrap_or_else(|| report.summary_en.clone());
        report.edit_summaries(summary_local, summary_en)?;
    }
    if let Some(note) = edits.note {
        report = report.with_note(note);
    }

    let store = ReportStore::open_default()?;
    let evicted = store.save(&report).await?;

    eprintln!("\n✅ Report saved");
    print_report(&report);

    for id in evicted {
        eprintln!("   (evicted oldest report {} - store keeps {})", id, MAX_REPORTS);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("ID:          {}", report.id);
    println!("Recorded:    {}", report.timestamp.to_rfc3339());
    println!("Language:    {}", report.language);
    println!("Domain:      {}", report.domain);
    println!("Severity:    {}", report.severity);
    println!("Issue:       {}", report.issue);
    if !report.location.is_empty() {
        println!("Location:    {}", report.location);
    }
    if let Some(geo) = &report.geo_location {
        println!("Coordinates: {} (±{}m)", geo.format_coordinates(), geo.accuracy);
    }
    if !report.entities.is_empty() {
        println!("Entities:    {}", report.entities.join(", "));
    }
    println!("Summary:     {}", report.summary_local);
    if report.summary_en != report.summary_local {
        println!("Summary(en): {}", report.summary_en);
    }
    if let Some(note) = &report.field_worker_note {
        println!("Note:        {}", note);
    }
    println!("Synced:      {}", if report.synced { "yes" } else { "no" });
}

async fn list_reports(pending_only: bool) -> Result<()> {
    let store = ReportStore::open_default()?;
    let reports = if pending_only {
        store.list_unsynced().await?
    } else {
        store.list().await?
    };

    if reports.is_empty() {
        println!("No reports found");
        return Ok(());
    }

    println!(
        "{:<50} {:<20} {:<10} {:<6}",
        "REPORT ID", "DOMAIN", "SEVERITY", "SYNCED"
    );
    println!("{}", "-".repeat(90));

    for report in &reports {
        println!(
            "{:<50} {:<20} {:<10} {:<6}",
            report.id,
            report.domain,
            report.severity,
            if report.synced { "yes" } else { "no" }
        );
    }

    println!("\nTotal: {} reports", reports.len());
    Ok(())
}

async fn show_report(report_id: &str, json: bool) -> Result<()> {
    let store = ReportStore::open_default()?;
    let report = store
        .get(report_id)
        .await?
        .with_context(|| format!("Report not found: {}", report_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        println!("\nTranscript:\n{}", report.transcription);
    }
    Ok(())
}

async fn delete_report(report_id: &str) -> Result<()> {
    let store = ReportStore::open_default()?;
    if store.delete(report_id).await? {
        eprintln!("🗑️  Deleted {}", report_id);
    } else {
        eprintln!("No report with id {}", report_id);
    }
    Ok(())
}

async fn clear_reports(confirmed: bool) -> Result<()> {
    if !confirmed {
        anyhow::bail!("Refusing to clear the store without --yes");
    }

    let store = ReportStore::open_default()?;
    let removed = store.clear().await?;
    eprintln!("🗑️  Removed {} reports", removed);
    Ok(())
}

async fn show_stats() -> Result<()> {
    let store = ReportStore::open_default()?;
    let stats = store.stats().await?;

    println!("Reports: {} ({} synced, {} pending)", stats.total, stats.synced, stats.pending);

    if stats.total == 0 {
        return Ok(());
    }

    println!("\nBy domain:");
    for (domain, count) in &stats.by_domain {
        println!("  {:<20} {}", domain, count);
    }
    println!("\nBy severity:");
    for (severity, count) in &stats.by_severity {
        println!("  {:<20} {}", severity, count);
    }
    println!("\nBy language:");
    for (language, count) in &stats.by_language {
        println!("  {:<20} {}", language, count);
    }
    Ok(())
}

/// Wire the reconciler to the configured collector and the default store
fn build_reconciler(config: &ResolvedConfig, force_offline: bool) -> Result<SyncReconciler> {
    let store = ReportStore::open_default()?;
    let collector = HttpCollector::new(&config.collector_url, config.request_timeout())
        .context("Failed to build collector client")?;

    let connectivity: Arc<dyn Connectivity> = if force_offline {
        Arc::new(StaticConnectivity(false))
    } else {
        Arc::new(
            HttpProbe::new(&config.collector_url, config.request_timeout())
                .context("Failed to build reachability probe")?,
        )
    };

    Ok(SyncReconciler::new(
        Arc::new(store),
        Arc::new(collector),
        connectivity,
    ))
}

async fn run_sync(force_offline: bool) -> Result<()> {
    let config = config::config()?;
    let reconciler = build_reconciler(config, force_offline)?;

    eprintln!("🔄 Syncing with {}...", config.collector_url);
    let result = reconciler.trigger_manual_sync().await;

    if result.success {
        eprintln!("✅ {}", result.message);
        Ok(())
    } else {
        anyhow::bail!("{}", result.message)
    }
}

async fn watch() -> Result<()> {
    let config = config::config()?;
    let reconciler = Arc::new(build_reconciler(config, false)?);
    let auto = AutoSync::new(reconciler, config.sync_schedule());

    eprintln!(
        "👀 Watching {} (every {}s, Ctrl+C to stop)",
        config.collector_url, config.timing.sync_interval_seconds
    );

    let total = auto.run(shutdown_signal(tokio::signal::ctrl_c())).await;

    eprintln!("\nSynced {} reports this session", total);
    Ok(())
}

/// Resolve when `signal` fires. If the handler could not be installed, log
/// it and never resolve, leaving the process to be stopped externally.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("Failed to listen for Ctrl+C, watch will run until killed: {}", e);
        std::future::pending::<()>().await;
    }
}

fn classify(text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Nothing to classify");
    }

    let transcription = TranscriptionResult {
        text: text.to_string(),
        language: detect_language(text),
        confidence: 1.0,
    };
    let interpretation = interpret(&transcription);

    println!("Language:   {}", transcription.language);
    println!(
        "Domain:     {} (confidence {:.2})",
        interpretation.classification.domain, interpretation.classification.confidence
    );
    println!("Severity:   {}", interpretation.nlu.severity);
    println!("Issue:      {}", interpretation.nlu.issue);
    println!("Location:   {}", interpretation.nlu.location);
    println!("Entities:   {}", interpretation.nlu.entities.join(", "));
    println!("Summary:    {}", interpretation.nlu.summary_local);
    println!("Summary(en): {}", interpretation.nlu.summary_en);
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("gramsense configuration\n");
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("Home:        {}", config.home.display());
    println!("Store:       {}", config.store_path().display());
    println!("Collector:   {}", config.collector_url);
    println!("\nTiming:");
    println!("  request timeout:   {}s", config.timing.request_timeout_seconds);
    println!("  sync interval:     {}s", config.timing.sync_interval_seconds);
    println!("  startup delay:     {}s", config.timing.sync_initial_delay_seconds);
    println!("  connectivity poll: {}s", config.timing.connectivity_poll_seconds);
    println!("  geo timeout:       {}s", config.timing.geo_timeout_seconds);
    Ok(())
}
