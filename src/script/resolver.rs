//! Joins a scope's config with on-disk manifests into runnable descriptors

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::manifest::PackageManifest;
use crate::config::{CONFIG_FILE, ClientConfig, ConfigScope, ModuleEntry, ScopeRoots};
use crate::error::{Result, ScriptifyError};

/// Everything needed to run one enabled script.
///
/// Derived on every call to [`get_script_files`]; never cached.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptDescriptor {
    /// Package name, the key in `scriptify.json`
    pub id: String,
    pub scope: ConfigScope,
    pub display_name: String,
    pub description: Option<String>,
    /// Entry file (`<module_root>/<main>`)
    pub entry_path: PathBuf,
    pub module_root: PathBuf,
    /// The scope's `.scriptify` directory
    pub scope_root: PathBuf,
    pub module_config: ModuleEntry,
    pub manifest: PackageManifest,
}

/// Module directory of a config entry: its `path` override relative to the
/// scope root, or `node_modules/<name>`
pub fn module_path(scope_root: &Path, name: &str, entry: &ModuleEntry) -> PathBuf {
    match entry.path.as_deref() {
        Some(path) if !path.is_empty() => scope_root.join(path),
        _ => scope_root.join("node_modules").join(name),
    }
}

/// List the enabled scripts of a scope in config order.
///
/// A scope that is not set up yet yields an empty list. An enabled entry
/// whose manifest cannot be read fails the whole call.
pub fn get_script_files(roots: &ScopeRoots, scope: ConfigScope) -> Result<Vec<ScriptDescriptor>> {
    let Some(scope_root) = roots.try_scope_root(scope) else {
        tracing::debug!("{} scope has no root, no scripts", scope);
        return Ok(Vec::new());
    };

    if !scope_root.is_dir() || !scope_root.join(CONFIG_FILE).is_file() {
        return Ok(Vec::new());
    }

    let config = ClientConfig::load(roots, scope)?;

    config
        .modules()
        .iter()
        .filter(|(_, entry)| entry.enabled)
        .map(|(name, entry)| describe(&scope_root, scope, name, entry))
        .collect()
}

fn describe(
    scope_root: &Path,
    scope: ConfigScope,
    name: &str,
    entry: &ModuleEntry,
) -> Result<ScriptDescriptor> {
    let module_root = module_path(scope_root, name, entry);

    let manifest =
        PackageManifest::read(&module_root).map_err(|e| ScriptifyError::ScriptResolution {
            package: name.to_string(),
            path: module_root.clone(),
            reason: e.to_string(),
        })?;

    Ok(ScriptDescriptor {
        id: name.to_string(),
        scope,
        display_name: manifest.display_name(name).to_string(),
        description: manifest.script_description().map(str::to_string),
        entry_path: module_root.join(manifest.main()),
        module_root,
        scope_root: scope_root.to_path_buf(),
        module_config: entry.clone(),
        manifest,
    })
}

/// Scripts of both scopes, local first, sorted by display name
pub fn get_all_script_files(roots: &ScopeRoots) -> Result<Vec<ScriptDescriptor>> {
    let mut scripts = get_script_files(roots, ConfigScope::Local)?;
    scripts.extend(get_script_files(roots, ConfigScope::Global)?);
    sort_by_display_name(&mut scripts);
    Ok(scripts)
}

/// Case-insensitive alphabetical order; ties fall back to the exact name,
/// then the scope
pub fn sort_by_display_name(scripts: &mut [ScriptDescriptor]) {
    scripts.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.scope.cmp(&b.scope))
    });
}
