//! npm registry search for published scripts

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Result, ScriptifyError};

/// Maximum number of results requested per search
pub const SEARCH_PAGE_SIZE: usize = 250;

/// Author block of a registry entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A package found in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryPackage {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<RegistryAuthor>,
    #[serde(default)]
    pub links: serde_json::Map<String, serde_json::Value>,
}

impl RegistryPackage {
    /// Format for display in search results
    pub fn display_line(&self) -> String {
        let version = self
            .version
            .as_deref()
            .map(|v| format!("@{}", v))
            .unwrap_or_default();
        match self.description.as_deref().filter(|d| !d.is_empty()) {
            Some(desc) => format!("{}{} - {}", self.name, version, desc),
            None => format!("{}{}", self.name, version),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchObject {
    package: RegistryPackage,
}

/// Response of `/-/v1/search`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

/// Client for the registry search endpoint
#[derive(Clone)]
pub struct RegistryClient {
    base_url: String,
    scope: String,
    client: ureq::Agent,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>, scope: impl Into<String>) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(30))
            .build();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            scope: scope.into(),
            client,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.registry_url, &settings.registry_scope)
    }

    /// Value of the search `text` parameter: the scope qualifier, then the
    /// keyword if any
    pub fn search_text(&self, keyword: Option<&str>) -> String {
        match keyword.map(str::trim).filter(|k| !k.is_empty()) {
            Some(keyword) => format!("scope:{} {}", self.scope, keyword),
            None => format!("scope:{}", self.scope),
        }
    }

    /// Packages in the scriptify scope, optionally filtered by keyword
    pub fn search(&self, keyword: Option<&str>) -> Result<Vec<RegistryPackage>> {
        let text = self.search_text(keyword);
        tracing::debug!("Searching registry {} for \"{}\"", self.base_url, text);

        let response: SearchResponse = self
            .client
            .get(&format!("{}/-/v1/search", self.base_url))
            .query("text", &text)
            .query("size", &SEARCH_PAGE_SIZE.to_string())
            .call()
            .map_err(|e| ScriptifyError::Registry(e.to_string()))?
            .into_json()
            .map_err(|e| ScriptifyError::Registry(format!("invalid search response: {}", e)))?;

        Ok(response.objects.into_iter().map(|o| o.package).collect())
    }
}
