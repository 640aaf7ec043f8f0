//! Per-scope `scriptify.json` handling
//!
//! The document lists which script packages are enabled in a scope:
//! ```json
//! {
//!     "$schema": "...",
//!     "modules": {
//!         "@scriptify-vscode/sort-json": { "enabled": true, "out": "file" }
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scope::{ConfigScope, ScopeRoots};
use crate::error::{Result, ScriptifyError};

/// File name of the per-scope config document
pub const CONFIG_FILE: &str = "scriptify.json";

/// Where transform results are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLocation {
    /// Replace each selection in place
    Selection,
    /// Open each result as a new untitled document
    File,
    /// Append each result to the output channel
    OutputChannel,
    /// Unknown value, results are dropped
    Other(String),
}

impl OutputLocation {
    pub fn parse(value: &str) -> Self {
        match value {
            "selection" => Self::Selection,
            "file" => Self::File,
            "outputChannel" => Self::OutputChannel,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Settings of one package inside `modules`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub enabled: bool,

    /// Install location relative to the scope's `.scriptify` directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Environment exposed to the script as `process.env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Map<String, Value>>,

    /// Any other keys (e.g. `out`) are kept as-is and handed to the script
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleEntry {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            path: None,
            env: None,
            extra: Map::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: Option<Map<String, Value>>) -> Self {
        self.env = env;
        self
    }

    /// The configured `out` key, `selection` when absent
    pub fn output_location(&self) -> OutputLocation {
        match self.extra.get("out").and_then(Value::as_str) {
            Some(out) => OutputLocation::parse(out),
            None => OutputLocation::Selection,
        }
    }

    /// The entry as the JSON object handed to transform functions
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Serialized shape of `scriptify.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfigDocument {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub modules: IndexMap<String, ModuleEntry>,
}

/// A loaded config document bound to the file it came from.
///
/// Mutations stay in memory until [`save`](ClientConfig::save) is called, so
/// a failed multi-step operation never reaches disk.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    scope: ConfigScope,
    path: PathBuf,
    document: ClientConfigDocument,
}

impl ClientConfig {
    /// Load the scope's config, creating a default document first if the file
    /// does not exist yet
    pub fn load(roots: &ScopeRoots, scope: ConfigScope) -> Result<Self> {
        let root = roots.scope_root(scope)?;
        let path = root.join(CONFIG_FILE);

        ensure_config_file(&path)?;
        let document = read_document(&path)?;

        Ok(Self {
            scope,
            path,
            document,
        })
    }

    /// Path of the backing `scriptify.json`
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the config and installed modules
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    pub fn document(&self) -> &ClientConfigDocument {
        &self.document
    }

    pub fn modules(&self) -> &IndexMap<String, ModuleEntry> {
        &self.document.modules
    }

    /// Write the in-memory document back to disk, pretty-printed
    pub fn save(&self) -> Result<()> {
        let content = to_pretty_json(&self.document)
            .map_err(|e| ScriptifyError::io(&self.path, e.into()))?;
        std::fs::write(&self.path, content).map_err(|e| ScriptifyError::io(&self.path, e))?;
        tracing::debug!("Saved {}", self.path.display());
        Ok(())
    }

    /// Insert or replace a package entry (not persisted)
    pub fn add_package(&mut self, name: impl Into<String>, entry: ModuleEntry) -> &mut Self {
        self.document.modules.insert(name.into(), entry);
        self
    }

    /// Remove a package entry (not persisted)
    pub fn remove_package(&mut self, name: &str) -> Result<ModuleEntry> {
        self.document
            .modules
            .shift_remove(name)
            .ok_or_else(|| ScriptifyError::PackageNotFound(name.to_string()))
    }
}

/// Create the directory and a default document when the file is missing
fn ensure_config_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ScriptifyError::io(parent, e))?;
    }

    let content = to_pretty_json(&ClientConfigDocument::default())
        .map_err(|e| ScriptifyError::io(path, e.into()))?;
    std::fs::write(path, content).map_err(|e| ScriptifyError::io(path, e))?;

    tracing::info!("Created {}", path.display());
    Ok(())
}

fn read_document(path: &Path) -> Result<ClientConfigDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| ScriptifyError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| ScriptifyError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize with four-space indentation
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf).unwrap_or_default())
}
