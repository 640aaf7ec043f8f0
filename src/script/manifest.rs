//! The subset of `package.json` a script package is read through

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of a package manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Entry file used when a manifest has no `main`
pub const DEFAULT_MAIN: &str = "index.js";

/// Scriptify-specific block of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptifyMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Environment seeded into the module config on install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_env: Option<Map<String, Value>>,
}

/// A script package's `package.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scriptify: Option<ScriptifyMeta>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors reading a manifest, turned into resolution errors by callers
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("missing {MANIFEST_FILE}: {0}")]
    Missing(#[source] std::io::Error),

    #[error("invalid {MANIFEST_FILE}: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl PackageManifest {
    /// Read `<module_dir>/package.json`
    pub fn read(module_dir: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(module_dir.join(MANIFEST_FILE))
            .map_err(ManifestError::Missing)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Entry file relative to the module directory
    pub fn main(&self) -> &str {
        non_empty(self.main.as_deref()).unwrap_or(DEFAULT_MAIN)
    }

    /// `scriptify.name`, then `displayName`, then `fallback`
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.scriptify.as_ref().and_then(|s| s.name.as_deref()))
            .or_else(|| non_empty(self.display_name.as_deref()))
            .unwrap_or(fallback)
    }

    /// `scriptify.description`, then `description`
    pub fn script_description(&self) -> Option<&str> {
        non_empty(self.scriptify.as_ref().and_then(|s| s.description.as_deref()))
            .or_else(|| non_empty(self.description.as_deref()))
    }

    /// Declared default environment, if any
    pub fn default_env(&self) -> Option<&Map<String, Value>> {
        self.scriptify.as_ref().and_then(|s| s.default_env.as_ref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{ "name": "pkg", "displayName": "Pkg", "scriptify": { "name": "" } }"#,
        )
        .unwrap();
        assert_eq!(manifest.display_name("pkg"), "Pkg");

        let bare: PackageManifest = serde_json::from_str(r#"{ "name": "pkg" }"#).unwrap();
        assert_eq!(bare.display_name("id"), "id");
        assert_eq!(bare.main(), "index.js");
        assert_eq!(bare.script_description(), None);
    }

    #[test]
    fn test_scriptify_block() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{
                "name": "pkg",
                "description": "plain",
                "main": "lib.js",
                "scriptify": { "name": "My Tool", "defaultEnv": { "TOKEN": "" } }
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.display_name("pkg"), "My Tool");
        assert_eq!(manifest.main(), "lib.js");
        assert_eq!(manifest.script_description(), Some("plain"));
        assert!(manifest.default_env().unwrap().contains_key("TOKEN"));
    }
}
