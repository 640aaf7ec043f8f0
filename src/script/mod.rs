//! Script packages: manifests, discovery, scaffolding and removal

mod manifest;
mod remove;
mod resolver;
mod template;

pub use manifest::{DEFAULT_MAIN, MANIFEST_FILE, ManifestError, PackageManifest, ScriptifyMeta};
pub use remove::remove_script;
pub use resolver::{
    ScriptDescriptor, get_all_script_files, get_script_files, module_path, sort_by_display_name,
};
pub use template::{
    CreatedScript, MY_MODULES_DIR, SCRIPT_PACKAGE_SCOPE, SCRIPT_TEMPLATE, create_script,
    validate_script_name,
};
