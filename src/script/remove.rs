//! Removal of installed or created scripts

use super::resolver::ScriptDescriptor;
use crate::config::{ClientConfig, ScopeRoots};
use crate::error::{Result, ScriptifyError};

/// Unregister a script from its scope and delete its module directory.
///
/// The config is only saved once the directory is gone.
pub fn remove_script(roots: &ScopeRoots, script: &ScriptDescriptor) -> Result<()> {
    let mut config = ClientConfig::load(roots, script.scope)?;
    config.remove_package(&script.id)?;

    match std::fs::remove_dir_all(&script.module_root) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ScriptifyError::io(&script.module_root, e)),
    }

    config.save()?;
    tracing::info!("{} removed", script.display_name);
    Ok(())
}
