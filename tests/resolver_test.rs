//! Script resolution against on-disk scopes

mod common;

use serde_json::json;

use common::Fixture;
use scriptify::ScriptifyError;
use scriptify::config::{ClientConfig, ConfigScope};
use scriptify::script::{create_script, get_all_script_files, get_script_files, remove_script};

#[test]
fn test_manifest_main_and_scriptify_name() {
    let fixture = Fixture::new();
    fixture.write_config(
        ConfigScope::Local,
        json!({ "modules": { "pkg-a": { "enabled": true } } }),
    );
    fixture.write_package(
        ConfigScope::Local,
        "pkg-a",
        json!({ "name": "pkg-a", "main": "lib.js", "scriptify": { "name": "My Tool" } }),
        &[("lib.js", "module.exports = (t) => t;")],
    );

    let scripts = get_script_files(&fixture.roots(), ConfigScope::Local).unwrap();

    assert_eq!(scripts.len(), 1);
    let script = &scripts[0];
    assert_eq!(script.id, "pkg-a");
    assert_eq!(script.display_name, "My Tool");
    assert_eq!(script.scope, ConfigScope::Local);
    assert!(script.entry_path.ends_with("pkg-a/lib.js"));
}

#[test]
fn test_display_name_falls_through_empty_values() {
    let fixture = Fixture::new();
    fixture.write_config(
        ConfigScope::Global,
        json!({ "modules": { "pkg-b": { "enabled": true } } }),
    );
    fixture.write_package(
        ConfigScope::Global,
        "pkg-b",
        json!({ "name": "pkg-b", "displayName": "Pretty B", "scriptify": { "name": "" } }),
        &[("index.js", "")],
    );

    let scripts = get_script_files(&fixture.roots(), ConfigScope::Global).unwrap();
    assert_eq!(scripts[0].display_name, "Pretty B");
    assert!(scripts[0].entry_path.ends_with("pkg-b/index.js"));
}

#[test]
fn test_zero_enabled_modules_is_empty() {
    let fixture = Fixture::new();
    fixture.write_config(
        ConfigScope::Local,
        json!({ "modules": { "off": { "enabled": false } } }),
    );

    let scripts = get_script_files(&fixture.roots(), ConfigScope::Local).unwrap();
    assert!(scripts.is_empty());

    // Global scope was never set up
    let scripts = get_script_files(&fixture.roots(), ConfigScope::Global).unwrap();
    assert!(scripts.is_empty());
}

#[test]
fn test_local_scope_without_workspace_is_empty() {
    let fixture = Fixture::new();
    let scripts = get_script_files(&fixture.global_only(), ConfigScope::Local).unwrap();
    assert!(scripts.is_empty());
}

#[test]
fn test_missing_manifest_fails_whole_resolution() {
    let fixture = Fixture::new();
    fixture.write_config(
        ConfigScope::Local,
        json!({ "modules": {
            "good": { "enabled": true },
            "missing": { "enabled": true }
        } }),
    );
    fixture.write_package(
        ConfigScope::Local,
        "good",
        json!({ "name": "good" }),
        &[("index.js", "")],
    );

    let err = get_script_files(&fixture.roots(), ConfigScope::Local).unwrap_err();
    match err {
        ScriptifyError::ScriptResolution { package, .. } => assert_eq!(package, "missing"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_path_override_is_relative_to_scope_root() {
    let fixture = Fixture::new();
    fixture.write_config(
        ConfigScope::Local,
        json!({ "modules": { "custom": { "enabled": true, "path": "./vendor/custom" } } }),
    );
    common::write_file(
        &fixture
            .scope_dir(ConfigScope::Local)
            .join("vendor/custom/package.json"),
        r#"{ "name": "custom" }"#,
    );

    let scripts = get_script_files(&fixture.roots(), ConfigScope::Local).unwrap();
    assert!(scripts[0].module_root.ends_with("vendor/custom"));
}

#[test]
fn test_all_scopes_sorted_case_insensitively() {
    let fixture = Fixture::new();
    fixture.write_config(
        ConfigScope::Local,
        json!({ "modules": { "zeta": { "enabled": true }, "beta": { "enabled": true } } }),
    );
    fixture.write_config(
        ConfigScope::Global,
        json!({ "modules": { "alpha": { "enabled": true } } }),
    );
    for (scope, name, display) in [
        (ConfigScope::Local, "zeta", "Zeta"),
        (ConfigScope::Local, "beta", "beta"),
        (ConfigScope::Global, "alpha", "Alpha"),
    ] {
        fixture.write_package(
            scope,
            name,
            json!({ "name": name, "scriptify": { "name": display } }),
            &[],
        );
    }

    let names: Vec<String> = get_all_script_files(&fixture.roots())
        .unwrap()
        .into_iter()
        .map(|s| s.display_name)
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "Zeta"]);
}

#[test]
fn test_created_script_is_resolved_and_removed() {
    let fixture = Fixture::new();
    let roots = fixture.roots();

    let created = create_script(&roots, ConfigScope::Local, "shout", false).unwrap();
    assert_eq!(created.package_name, "@scriptify-vscode/shout");
    assert!(created.script_path.is_file());

    let scripts = get_script_files(&roots, ConfigScope::Local).unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].display_name, "shout");
    assert_eq!(scripts[0].entry_path, created.script_path);

    let err = create_script(&roots, ConfigScope::Local, "shout", false).unwrap_err();
    assert!(matches!(err, ScriptifyError::ScriptExists(_)));
    create_script(&roots, ConfigScope::Local, "shout", true).unwrap();

    remove_script(&roots, &scripts[0]).unwrap();
    assert!(!created.module_root.exists());
    let config = ClientConfig::load(&roots, ConfigScope::Local).unwrap();
    assert!(config.modules().is_empty());
}

#[test]
fn test_create_script_rejects_bad_names() {
    let fixture = Fixture::new();
    let err = create_script(&fixture.roots(), ConfigScope::Global, "Not Valid", false).unwrap_err();
    assert!(matches!(err, ScriptifyError::InvalidScriptName(_)));
}
