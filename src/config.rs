//! Configuration for gramsense paths, collector and sync timing.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GRAMSENSE_HOME, GRAMSENSE_COLLECTOR_URL)
//! 2. Config file (.gramsense/config.yaml)
//! 3. Defaults (~/.gramsense, http://localhost:8000)
//!
//! Config file discovery:
//! - Searches current directory and parents for .gramsense/config.yaml
//! - `paths.home` is relative to the .gramsense/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::SyncSchedule;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const HOME_ENV: &str = "GRAMSENSE_HOME";
pub const COLLECTOR_URL_ENV: &str = "GRAMSENSE_COLLECTOR_URL";

const DEFAULT_COLLECTOR_URL: &str = "http://localhost:8000";
const STORE_FILE: &str = "reports.db";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub collector: Option<CollectorConfig>,
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    #[serde(default)]
    pub geo: Option<GeoConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Local state directory (relative to .gramsense/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    pub base_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub interval_seconds: Option<u64>,
    pub initial_delay_seconds: Option<u64>,
    pub connectivity_poll_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoConfig {
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to gramsense home (local store lives here)
    pub home: PathBuf,
    /// Collector base URL, without trailing slash
    pub collector_url: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub timing: TimingSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingSettings {
    pub request_timeout_seconds: u64,
    pub sync_interval_seconds: u64,
    pub sync_initial_delay_seconds: u64,
    pub connectivity_poll_seconds: u64,
    pub geo_timeout_seconds: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            sync_interval_seconds: 300,
            sync_initial_delay_seconds: 2,
            connectivity_poll_seconds: 15,
            geo_timeout_seconds: 10,
        }
    }
}

impl ResolvedConfig {
    /// Path of the SQLite report store
    pub fn store_path(&self) -> PathBuf {
        self.home.join(STORE_FILE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.request_timeout_seconds)
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.geo_timeout_seconds)
    }

    /// Timers for the automatic sync triggers
    pub fn sync_schedule(&self) -> SyncSchedule {
        SyncSchedule {
            interval: Duration::from_secs(self.timing.sync_interval_seconds),
            initial_delay: Duration::from_secs(self.timing.sync_initial_delay_seconds),
            connectivity_poll: Duration::from_secs(self.timing.connectivity_poll_seconds),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".gramsense").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge env, file and defaults. `env` looks up a variable by name.
fn resolve_config(
    default_home: PathBuf,
    file: Option<(&Path, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let defaults = TimingSettings::default();

    let (config_file, config) = match file {
        Some((path, config)) => (Some(path.to_path_buf()), Some(config)),
        None => (None, None),
    };

    let home = if let Some(env_home) = env(HOME_ENV) {
        PathBuf::from(env_home)
    } else if let (Some(path), Some(home_path)) = (
        config_file.as_deref(),
        config.as_ref().and_then(|c| c.paths.home.as_deref()),
    ) {
        let gramsense_dir = path.parent().unwrap_or(Path::new("."));
        resolve_path(gramsense_dir, home_path)
    } else {
        default_home
    };

    let collector = config.as_ref().and_then(|c| c.collector.as_ref());
    let collector_url = env(COLLECTOR_URL_ENV)
        .or_else(|| collector.and_then(|c| c.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_COLLECTOR_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let sync = config.as_ref().and_then(|c| c.sync.as_ref());
    let geo = config.as_ref().and_then(|c| c.geo.as_ref());

    let timing = TimingSettings {
        request_timeout_seconds: collector
            .and_then(|c| c.request_timeout_seconds)
            .unwrap_or(defaults.request_timeout_seconds),
        sync_interval_seconds: sync
            .and_then(|s| s.interval_seconds)
            .unwrap_or(defaults.sync_interval_seconds),
        sync_initial_delay_seconds: sync
            .and_then(|s| s.initial_delay_seconds)
            .unwrap_or(defaults.sync_initial_delay_seconds),
        connectivity_poll_seconds: sync
            .and_then(|s| s.connectivity_poll_seconds)
            .unwrap_or(defaults.connectivity_poll_seconds),
        geo_timeout_seconds: geo
            .and_then(|g| g.timeout_seconds)
            .unwrap_or(defaults.geo_timeout_seconds),
    };

    ResolvedConfig {
        home,
        collector_url,
        config_file,
        timing,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".gramsense");

    let file = match find_config_file() {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    Ok(resolve_config(
        default_home,
        file.as_ref().map(|(path, parsed)| (path.as_path(), parsed.clone())),
        |name| std::env::var(name).ok(),
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the gramsense home directory.
pub fn gramsense_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the report store path ($GRAMSENSE_HOME/reports.db)
pub fn store_path() -> Result<PathBuf> {
    Ok(config()?.store_path())
}

/// Get the collector base URL
pub fn collector_url() -> Result<String> {
    Ok(config()?.collector_url.clone())
}
