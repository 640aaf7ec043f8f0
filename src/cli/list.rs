//! `scriptify list`

use anyhow::Result;

use super::App;
use scriptify::config::ConfigScope;
use scriptify::script::get_all_script_files;

/// List the enabled scripts of both scopes
pub fn list_command(app: &App, json: bool) -> Result<()> {
    let scripts = get_all_script_files(&app.roots)?;

    if json {
        let list: Vec<serde_json::Value> = scripts
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "name": s.display_name,
                    "description": s.description,
                    "scope": s.scope,
                    "entry": s.entry_path.display().to_string(),
                    "out": s.module_config.extra.get("out"),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if scripts.is_empty() {
        println!("No scripts enabled.");
        println!();
        println!("Scripts are loaded from:");
        for scope in [ConfigScope::Local, ConfigScope::Global] {
            match app.roots.scope_root(scope) {
                Ok(root) => println!("  - {} ({})", root.display(), scope),
                Err(e) => println!("  - {} scope unavailable: {}", scope, e),
            }
        }
        println!();
        println!("Create one with: scriptify create <name>");
        println!("or find published ones with: scriptify search");
        return Ok(());
    }

    for script in &scripts {
        println!("{} [{}] {}", script.display_name, script.scope, script.id);
        if let Some(description) = &script.description {
            println!("    {}", description);
        }
    }
    Ok(())
}
