//! Configuration scopes and the directories they resolve to

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptifyError};

/// Name of the per-scope directory holding `scriptify.json` and modules
pub const SCRIPTIFY_DIR: &str = ".scriptify";

/// Where a script is configured and installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigScope {
    /// User-wide scripts under the global folder
    Global,
    /// Scripts of the single open project
    Local,
}

impl ConfigScope {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigScope::Global => "Global",
            ConfigScope::Local => "Local",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The directories both scopes resolve against.
///
/// Passed by value to every operation that touches a scope; there is no
/// process-wide "current workspace".
#[derive(Debug, Clone)]
pub struct ScopeRoots {
    global_folder: PathBuf,
    workspace_roots: Vec<PathBuf>,
}

impl ScopeRoots {
    pub fn new(global_folder: impl Into<PathBuf>, workspace_roots: Vec<PathBuf>) -> Self {
        Self {
            global_folder: global_folder.into(),
            workspace_roots,
        }
    }

    /// The configured global folder (the parent of the global `.scriptify`)
    pub fn global_folder(&self) -> &Path {
        &self.global_folder
    }

    /// The single open project root
    pub fn workspace_folder(&self) -> Result<&Path> {
        match self.workspace_roots.as_slice() {
            [] => Err(ScriptifyError::NoWorkspace),
            [root] => Ok(root.as_path()),
            roots => Err(ScriptifyError::MultipleWorkspaceRoots(roots.len())),
        }
    }

    /// Resolve `<scope-dir>/.scriptify` for a scope
    pub fn scope_root(&self, scope: ConfigScope) -> Result<PathBuf> {
        let base = match scope {
            ConfigScope::Global => self.global_folder.as_path(),
            ConfigScope::Local => self.workspace_folder()?,
        };
        Ok(base.join(SCRIPTIFY_DIR))
    }

    /// Like [`scope_root`](Self::scope_root) but treats an unresolvable
    /// local scope as "nothing configured"
    pub fn try_scope_root(&self, scope: ConfigScope) -> Option<PathBuf> {
        self.scope_root(scope).ok()
    }

    /// Shared dependency cache used by the sandbox package helpers
    pub fn package_cache(&self) -> PathBuf {
        self.global_folder.join(SCRIPTIFY_DIR).join("packages")
    }
}
