//! Scaffolding for new local script packages

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, json};

use super::manifest::{DEFAULT_MAIN, MANIFEST_FILE, PackageManifest, ScriptifyMeta};
use crate::config::{ClientConfig, ConfigScope, ModuleEntry, ScopeRoots, to_pretty_json};
use crate::error::{Result, ScriptifyError};

/// npm scope new scripts are created under
pub const SCRIPT_PACKAGE_SCOPE: &str = "@scriptify-vscode";

/// Folder (relative to the scope root) holding hand-written scripts
pub const MY_MODULES_DIR: &str = "my-modules";

static PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:@(?:[a-z0-9-*~][a-z0-9-*._~]*)?/)?[a-z0-9-~][a-z0-9-._~]*$")
        .expect("package name pattern is valid")
});

/// Body of a freshly created `index.js`
pub const SCRIPT_TEMPLATE: &str = r#"
function transform(value) {
  // TODO: Implement your transformation logic here
  return `Hello ${value}`;
}

module.exports = transform;
"#;

/// Where a created script was written
#[derive(Debug, Clone)]
pub struct CreatedScript {
    pub package_name: String,
    pub module_root: PathBuf,
    pub script_path: PathBuf,
}

/// Check a name against npm's package naming rules
pub fn validate_script_name(name: &str) -> Result<()> {
    if !name.is_empty() && PACKAGE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ScriptifyError::InvalidScriptName(name.to_string()))
    }
}

fn template_manifest(script_name: &str, package_name: &str) -> PackageManifest {
    let mut extra = Map::new();
    extra.insert(
        "scripts".into(),
        json!({ "test": "echo \"Error: no test specified\" && exit 1" }),
    );
    extra.insert("keywords".into(), json!([]));
    extra.insert("author".into(), json!("scriptify"));
    extra.insert("license".into(), json!("ISC"));
    extra.insert("dependencies".into(), json!({}));
    extra.insert("devDependencies".into(), json!({}));

    PackageManifest {
        name: package_name.to_string(),
        display_name: Some(script_name.to_string()),
        description: Some(String::new()),
        version: Some("0.0.0".to_string()),
        main: Some(DEFAULT_MAIN.to_string()),
        scriptify: Some(ScriptifyMeta {
            name: Some(String::new()),
            description: Some(String::new()),
            default_env: None,
        }),
        extra,
    }
}

/// Create `<scope>/.scriptify/my-modules/@scriptify-vscode/<name>` with a
/// manifest and a template entry file, and enable it in the scope's config.
///
/// An existing entry file is only replaced when `overwrite` is set.
pub fn create_script(
    roots: &ScopeRoots,
    scope: ConfigScope,
    name: &str,
    overwrite: bool,
) -> Result<CreatedScript> {
    validate_script_name(name)?;

    let mut config = ClientConfig::load(roots, scope)?;
    let package_name = format!("{}/{}", SCRIPT_PACKAGE_SCOPE, name);
    let relative = format!("./{}/{}", MY_MODULES_DIR, package_name);
    let module_root = config.root().join(MY_MODULES_DIR).join(&package_name);
    let script_path = module_root.join(DEFAULT_MAIN);

    if script_path.exists() && !overwrite {
        return Err(ScriptifyError::ScriptExists(script_path));
    }

    std::fs::create_dir_all(&module_root).map_err(|e| ScriptifyError::io(&module_root, e))?;

    let manifest_path = module_root.join(MANIFEST_FILE);
    let manifest = to_pretty_json(&template_manifest(name, &package_name))
        .map_err(|e| ScriptifyError::io(&manifest_path, e.into()))?;
    std::fs::write(&manifest_path, manifest).map_err(|e| ScriptifyError::io(&manifest_path, e))?;

    config.add_package(&package_name, ModuleEntry::enabled().with_path(relative));
    config.save()?;

    std::fs::write(&script_path, SCRIPT_TEMPLATE)
        .map_err(|e| ScriptifyError::io(&script_path, e))?;

    tracing::info!("Script \"{}\" created at {}", package_name, script_path.display());

    Ok(CreatedScript {
        package_name,
        module_root,
        script_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_script_name() {
        assert!(validate_script_name("to-camel-case").is_ok());
        assert!(validate_script_name("@me/tool").is_ok());
        assert!(validate_script_name("Upper").is_err());
        assert!(validate_script_name("has space").is_err());
        assert!(validate_script_name("").is_err());
    }
}
