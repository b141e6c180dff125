use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use folio_core::autosave::{AutosaveSettings, DEFAULT_DEBOUNCE_MS, DEFAULT_FLUSH_INTERVAL_SECS};
use folio_core::session::{SessionSettings, DEFAULT_SECRET, DEFAULT_TTL_HOURS};
use folio_core::Category;

use crate::constants::STORE_FILE_NAME;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub autosave: AutosaveSection,
    #[serde(default)]
    pub catalog: CatalogSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub ttl_hours: i64,
    pub secret_file: Option<String>,
    pub default_secret: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_TTL_HOURS,
            secret_file: None,
            default_secret: DEFAULT_SECRET.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSection {
    pub debounce_ms: i64,
    pub flush_interval_secs: i64,
}

impl Default for AutosaveSection {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl FolioConfig {
    pub fn session_settings(&self) -> anyhow::Result<SessionSettings> {
        if self.session.ttl_hours <= 0 {
            return Err(anyhow::anyhow!(
                "session.ttl_hours must be positive (got {})",
                self.session.ttl_hours
            ));
        }
        Ok(SessionSettings {
            ttl: bounded(
                Duration::try_hours(self.session.ttl_hours),
                "session.ttl_hours",
            )?,
            default_secret: self.session.default_secret.clone(),
        })
    }

    pub fn autosave_settings(&self) -> anyhow::Result<AutosaveSettings> {
        if self.autosave.debounce_ms <= 0 || self.autosave.flush_interval_secs <= 0 {
            return Err(anyhow::anyhow!(
                "autosave.debounce_ms and autosave.flush_interval_secs must be positive"
            ));
        }
        Ok(AutosaveSettings {
            debounce: bounded(
                Duration::try_milliseconds(self.autosave.debounce_ms),
                "autosave.debounce_ms",
            )?,
            flush_interval: bounded(
                Duration::try_seconds(self.autosave.flush_interval_secs),
                "autosave.flush_interval_secs",
            )?,
        })
    }

    /// Categories used until the store holds its own catalog index.
    pub fn seed_categories(&self) -> Vec<Category> {
        self.catalog
            .categories
            .iter()
            .map(|seed| Category::from_name(&seed.name).with_projects(seed.projects.iter().cloned()))
            .collect()
    }

    pub fn secret_file(&self) -> Option<PathBuf> {
        self.session.secret_file.as_deref().map(expand_home)
    }

    pub fn store_path(&self) -> Option<PathBuf> {
        self.store.path.as_deref().map(expand_home)
    }
}

/// A configured span, rejected when the clock cannot be advanced by it.
fn bounded(span: Option<Duration>, field: &str) -> anyhow::Result<Duration> {
    span.filter(|span| Utc::now().checked_add_signed(*span).is_some())
        .ok_or_else(|| anyhow::anyhow!("{} is too large", field))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match home_dir() {
            Ok(home) => home.join(rest),
            Err(_) => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(STORE_FILE_NAME))
}

/// Read a config file; a missing file yields the defaults.
pub fn read_config(path: &Path) -> anyhow::Result<FolioConfig> {
    if !path.exists() {
        return Ok(FolioConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("folio"));
        }
    }
    Ok(home_dir()?.join(".config").join("folio"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("folio"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("folio"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
