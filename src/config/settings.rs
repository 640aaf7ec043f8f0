//! Host settings (`~/.scriptify/settings.toml`)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::installer::PackageManager;

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Parent directory of the global `.scriptify` folder.
    /// Falls back to the OS temp directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_folder_location: Option<PathBuf>,

    /// Package manager used to install scripts
    #[serde(default)]
    pub favorite_package_manager: PackageManager,

    /// Number of recently picked scripts kept at the top of the picker
    #[serde(default = "default_recent_max_history")]
    pub recent_max_history: usize,

    /// Base URL of the npm-compatible registry
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// npm scope searched for published scripts
    #[serde(default = "default_registry_scope")]
    pub registry_scope: String,
}

fn default_recent_max_history() -> usize {
    10
}

fn default_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_registry_scope() -> String {
    "scriptify-vscode".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_folder_location: None,
            favorite_package_manager: PackageManager::default(),
            recent_max_history: default_recent_max_history(),
            registry_url: default_registry_url(),
            registry_scope: default_registry_scope(),
        }
    }
}

impl Settings {
    /// The resolved global folder
    pub fn global_folder(&self) -> PathBuf {
        self.global_folder_location
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("favorite_package_manager = \"pnpm\"").unwrap();
        assert_eq!(settings.favorite_package_manager, PackageManager::Pnpm);
        assert_eq!(settings.recent_max_history, 10);
        assert_eq!(settings.registry_scope, "scriptify-vscode");
        assert_eq!(settings.global_folder(), std::env::temp_dir());
    }

    #[test]
    fn test_global_folder_override() {
        let settings = Settings {
            global_folder_location: Some(PathBuf::from("/srv/scripts")),
            ..Settings::default()
        };
        assert_eq!(settings.global_folder(), PathBuf::from("/srv/scripts"));
    }
}
