//! Persistent key/value storage and the recent-pick history kept in it

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::to_pretty_json;
use crate::error::{Result, ScriptifyError};

/// JSON object persisted to a single file; every update is written through
#[derive(Debug, Clone)]
pub struct ClientStorage {
    path: PathBuf,
    data: Map<String, Value>,
}

impl ClientStorage {
    /// File name of the storage inside the host config directory
    pub const FILE: &'static str = "state.json";

    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt storage {}: {}", path.display(), e);
                Map::new()
            }),
            Err(_) => Map::new(),
        };
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set `key` and persist immediately. Empty keys are ignored.
    pub fn update(&mut self, key: &str, value: Value) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        self.data.insert(key.to_string(), value);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScriptifyError::io(parent, e))?;
        }
        let content =
            to_pretty_json(&self.data).map_err(|e| ScriptifyError::io(&self.path, e.into()))?;
        std::fs::write(&self.path, content).map_err(|e| ScriptifyError::io(&self.path, e))
    }
}

/// A remembered picker entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Set when the item is recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl RecentItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            detail: None,
            last_used: None,
        }
    }
}

/// Most-recent-first list of picked items, deduplicated by label
#[derive(Debug, Clone)]
pub struct RecentHistory {
    namespace: String,
    max_history: usize,
}

impl RecentHistory {
    pub const DEFAULT_NAMESPACE: &'static str = "RecentQuickPick";

    pub fn new(namespace: impl Into<String>, max_history: usize) -> Self {
        Self {
            namespace: namespace.into(),
            max_history,
        }
    }

    pub fn items(&self, storage: &ClientStorage) -> Vec<RecentItem> {
        storage
            .get(&self.namespace)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Move `item` to the front and trim to the configured size
    pub fn record(&self, storage: &mut ClientStorage, mut item: RecentItem) -> Result<()> {
        item.last_used = Some(Utc::now());
        let mut items: Vec<RecentItem> = self
            .items(storage)
            .into_iter()
            .filter(|existing| existing.label != item.label)
            .collect();
        items.insert(0, item);
        items.truncate(self.max_history);

        let value = serde_json::to_value(&items).unwrap_or(Value::Array(Vec::new()));
        storage.update(&self.namespace, value)
    }

    pub fn clear(&self, storage: &mut ClientStorage) -> Result<()> {
        storage.update(&self.namespace, Value::Array(Vec::new()))
    }

    /// Order `labels` with remembered ones first (most recent first), then
    /// the rest in their original order. Remembered labels that are no longer
    /// offered are dropped.
    pub fn arrange<'a>(&self, storage: &ClientStorage, labels: &[&'a str]) -> Vec<&'a str> {
        let recent = self.items(storage);
        let mut ordered: Vec<&'a str> = recent
            .iter()
            .filter_map(|item| labels.iter().copied().find(|l| *l == item.label))
            .collect();
        ordered.extend(
            labels
                .iter()
                .copied()
                .filter(|l| !recent.iter().any(|item| item.label == *l)),
        );
        ordered
    }
}
