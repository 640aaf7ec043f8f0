//! Settings file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Settings;

impl Settings {
    /// Get the host config directory path (~/.scriptify/)
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".scriptify")
    }

    /// Get the settings file path (~/.scriptify/settings.toml)
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.toml")
    }

    /// Load settings from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(settings)
    }

    /// Load settings from ~/.scriptify/settings.toml, creating the file with
    /// defaults if it does not exist
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::settings_path())
    }

    /// Load settings from `path`, creating it with defaults when missing
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::auto_init(path)?;
        }
        Self::from_file(path)
    }

    /// Save settings with atomic write and file locking.
    ///
    /// 1. Exclusive lock prevents concurrent writes from parallel invocations
    /// 2. Atomic write (temp file + rename) prevents corruption on crash
    /// 3. Parent directory is created if needed
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;

        let _lock = acquire_lock(path)?;
        write_atomic(path, &content)
    }

    /// Create the settings file with defaults.
    ///
    /// Re-checks for the file after taking the lock; another process may have
    /// created it in the meantime.
    fn auto_init(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let _lock = acquire_lock(path)?;
        if path.exists() {
            return Ok(());
        }

        let content = toml::to_string_pretty(&Self::default())
            .with_context(|| "Failed to serialize default settings")?;
        write_atomic(path, &content)?;

        tracing::info!("Created {}", path.display());
        Ok(())
    }
}

/// Take an exclusive lock on a sibling `.lock` file; released on drop
fn acquire_lock(path: &Path) -> Result<File> {
    let lock_path = path.with_extension("toml.lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire settings lock")?;

    Ok(lock_file)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("toml.tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .with_context(|| "Failed to write settings content")?;
    temp_file
        .sync_all()
        .with_context(|| "Failed to sync settings file")?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename settings file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::PackageManager;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_init_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.toml");

        let settings = Settings::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");

        let settings = Settings {
            favorite_package_manager: PackageManager::Yarn,
            recent_max_history: 3,
            ..Settings::default()
        };
        settings.save_to_file(&path).unwrap();

        assert_eq!(Settings::from_file(&path).unwrap(), settings);
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
