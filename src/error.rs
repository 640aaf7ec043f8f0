//! Error type shared by the library layers
//!
//! Install cancellation and "no scripts configured" are not errors; they are
//! reported through [`crate::installer::InstallOutcome`] and
//! [`crate::apply::ApplyOutcome`].

use std::path::PathBuf;

/// Errors raised by configuration, resolution, installation and sandboxing
#[derive(Debug, thiserror::Error)]
pub enum ScriptifyError {
    #[error(
        "No folder open. Add a folder to your workspace, or use a global script instead."
    )]
    NoWorkspace,

    #[error(
        "Local scripts cannot be used on workspaces with multiple folders open ({0} roots). Use a global script instead."
    )]
    MultipleWorkspaceRoots(usize),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Package \"{0}\" is not registered in scriptify.json")]
    PackageNotFound(String),

    #[error("Cannot resolve enabled script \"{package}\" at {path}: {reason}")]
    ScriptResolution {
        package: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid script name \"{0}\": expected a valid npm package name")]
    InvalidScriptName(String),

    #[error("Script already exists: {0}")]
    ScriptExists(PathBuf),

    #[error("Failed to start {program}: {source}")]
    InstallSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The process ended with an error code: {}\n{stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    InstallFailed { code: Option<i32>, stderr: String },

    #[error("Registry request failed: {0}")]
    Registry(String),

    #[error("Syntax error in {file}: {message}")]
    SandboxCompile { file: String, message: String },

    #[error("Script {file} failed: {message}")]
    SandboxRuntime { file: String, message: String },

    #[error("Transform failed on selection {index}: {message}")]
    TransformBatch { index: usize, message: String },

    #[error("Editor error: {0}")]
    Editor(String),
}

impl ScriptifyError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ScriptifyError> = std::result::Result<T, E>;
