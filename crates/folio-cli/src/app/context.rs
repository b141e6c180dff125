//! Application context for the Folio CLI.
//!
//! Bundles the parsed arguments with the lazily-loaded config file and
//! knows how to assemble a [`Workspace`] from them.

use std::path::PathBuf;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use tracing::debug;

use folio_core::session::ConfigResource;
use folio_core::{Clock, SessionGate, SqliteStore, SystemClock, Workspace};

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_path, read_config, FolioConfig};
use crate::ui::UiContext;

use super::prompt::TerminalPrompt;

/// Workspace backed by the on-disk store.
pub type FolioWorkspace = Workspace<SqliteStore>;

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<FolioConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match self.cli.config.as_deref() {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_config_path(),
        }
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&FolioConfig> {
        self.config.get_or_try_init(|| {
            let path = self.config_path()?;
            debug!(path = %path.display(), "loading config");
            read_config(&path)
        })
    }

    /// Store path: `--store`, then the config file, then the XDG data dir.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.store.as_deref() {
            return Ok(PathBuf::from(path));
        }
        match self.config()?.store_path() {
            Some(path) => Ok(path),
            None => default_store_path(),
        }
    }

    /// Build the UI context for a command.
    pub fn ui_context(&self, json: bool, format: Option<&str>) -> UiContext {
        UiContext::from_env(json, format, self.cli.no_color, self.cli.ascii)
    }

    /// Open the store and assemble the workspace.
    pub fn open_workspace(&self) -> anyhow::Result<FolioWorkspace> {
        let config = self.config()?;
        let path = self.store_path()?;
        let store = SqliteStore::open(&path)?;

        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let mut gate = SessionGate::new(config.session_settings()?, Rc::clone(&clock))
            .with_prompt(TerminalPrompt);
        if let Some(file) = config.secret_file() {
            gate = gate.with_resource(ConfigResource::new(file));
        }

        let workspace = Workspace::load(store, gate, clock, config.seed_categories())?
            .with_autosave(config.autosave_settings()?);
        Ok(workspace)
    }
}
