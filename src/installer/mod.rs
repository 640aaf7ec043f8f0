//! Installation of script packages from a registry
//!
//! Installing is two steps that are deliberately not transactional:
//! 1. the package manager installs into the scope's `.scriptify` folder
//! 2. the package is registered (enabled) in that scope's `scriptify.json`
//!
//! If the second step never runs, re-running the install fixes it.

mod package_manager;
mod process;
mod registry;

pub use package_manager::PackageManager;
pub use process::{InstallCommand, InstallOutcome, run_install};
pub use registry::{RegistryAuthor, RegistryClient, RegistryPackage, SEARCH_PAGE_SIZE};

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::config::{ClientConfig, ConfigScope, ModuleEntry, ScopeRoots};
use crate::error::{Result, ScriptifyError};
use crate::script::{PackageManifest, module_path};

/// A package that was installed and enabled
#[derive(Debug, Clone)]
pub struct InstalledScript {
    pub package: String,
    pub module_root: PathBuf,
    pub entry: ModuleEntry,
    /// README shipped with the package, shown after install
    pub readme: Option<PathBuf>,
}

/// Result of [`install_and_register`]
#[derive(Debug, Clone)]
pub enum InstallReport {
    Completed(InstalledScript),
    Cancelled,
}

/// Install `package` into a scope and enable it there
pub async fn install_and_register<C>(
    roots: &ScopeRoots,
    scope: ConfigScope,
    manager: PackageManager,
    package: &str,
    cancel: C,
) -> Result<InstallReport>
where
    C: Future<Output = ()>,
{
    // Loading creates the scope folder the package manager runs in
    let config = ClientConfig::load(roots, scope)?;
    let command = InstallCommand::new(manager, package, config.root());

    match run_install(&command, cancel).await? {
        InstallOutcome::Completed => {
            let installed = register_installed(roots, scope, package)?;
            Ok(InstallReport::Completed(installed))
        }
        InstallOutcome::Cancelled => {
            tracing::info!("Installation of {} cancelled", package);
            Ok(InstallReport::Cancelled)
        }
    }
}

/// Enable an already installed package, seeding `env` from its manifest's
/// declared default environment
pub fn register_installed(
    roots: &ScopeRoots,
    scope: ConfigScope,
    package: &str,
) -> Result<InstalledScript> {
    let mut config = ClientConfig::load(roots, scope)?;
    let entry = ModuleEntry::enabled();
    let module_root = module_path(config.root(), package, &entry);

    let manifest =
        PackageManifest::read(&module_root).map_err(|e| ScriptifyError::ScriptResolution {
            package: package.to_string(),
            path: module_root.clone(),
            reason: e.to_string(),
        })?;

    let entry = entry.with_env(manifest.default_env().cloned());
    config.add_package(package, entry.clone());
    config.save()?;

    tracing::info!("Installed {} ({} scope)", package, scope);

    Ok(InstalledScript {
        package: package.to_string(),
        readme: find_readme(&module_root),
        module_root,
        entry,
    })
}

fn find_readme(module_root: &Path) -> Option<PathBuf> {
    ["README.md", "readme.md", "Readme.md"]
        .iter()
        .map(|name| module_root.join(name))
        .find(|path| path.is_file())
}
