//! CLI command implementations

pub mod apply;
pub mod editor;
pub mod install;
pub mod list;
pub mod manage;
pub mod picker;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use scriptify::config::{ConfigScope, SCRIPTIFY_DIR, ScopeRoots, Settings};
use scriptify::output::OutputChannel;
use scriptify::storage::{ClientStorage, RecentHistory};

/// Everything a command needs, resolved once from flags and settings
pub struct App {
    pub settings: Settings,
    pub roots: ScopeRoots,
    pub output: Arc<OutputChannel>,
}

impl App {
    pub fn load(workspaces: Vec<PathBuf>, global_folder: Option<PathBuf>) -> Result<Self> {
        let settings = Settings::load().context("Failed to load settings")?;

        let workspaces = if workspaces.is_empty() {
            vec![std::env::current_dir().context("Failed to read the current directory")?]
        } else {
            workspaces
        };
        let global_folder = global_folder.unwrap_or_else(|| settings.global_folder());
        let roots = ScopeRoots::new(&global_folder, workspaces);

        let log_path = global_folder
            .join(SCRIPTIFY_DIR)
            .join(OutputChannel::LOG_FILE);
        let output = Arc::new(OutputChannel::new(log_path, true));

        tracing::debug!("Global folder: {}", global_folder.display());

        Ok(Self {
            settings,
            roots,
            output,
        })
    }

    pub fn scope(global: bool) -> ConfigScope {
        if global {
            ConfigScope::Global
        } else {
            ConfigScope::Local
        }
    }

    /// Key/value storage next to the settings file
    pub fn storage(&self) -> ClientStorage {
        ClientStorage::open(Settings::config_dir().join(ClientStorage::FILE))
    }

    pub fn history(&self) -> RecentHistory {
        RecentHistory::new(
            RecentHistory::DEFAULT_NAMESPACE,
            self.settings.recent_max_history,
        )
    }
}
