//! Script management commands: create, remove, folder, config, history

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use super::App;
use scriptify::config::{ClientConfig, Settings};
use scriptify::script::{create_script, get_script_files, remove_script};

/// Create a script from the template and enable it
pub fn create_command(app: &App, name: &str, global: bool, force: bool) -> Result<()> {
    let scope = App::scope(global);
    let created = create_script(&app.roots, scope, name, force)?;

    println!("✓ Created script: {}", created.package_name);
    println!();
    println!("Directory: {}", created.module_root.display());
    println!("├── package.json    # Name and description shown in the picker");
    println!("└── index.js        # Your transform (edit this)");
    println!();
    println!("Run it with: scriptify apply --script {}", created.package_name);
    Ok(())
}

/// Remove a script from a scope, deleting its files
pub fn remove_command(app: &App, id: &str, global: bool, yes: bool) -> Result<()> {
    let scope = App::scope(global);
    let scripts = get_script_files(&app.roots, scope)?;
    let Some(script) = scripts.iter().find(|s| s.id == id) else {
        anyhow::bail!("No enabled {} script named \"{}\"", scope, id);
    };

    if !yes && !confirm(&format!(
        "Remove {} and delete {}?",
        script.display_name,
        script.module_root.display()
    ))? {
        println!("Cancelled.");
        return Ok(());
    }

    remove_script(&app.roots, script)?;
    println!("✓ {} removed", script.display_name);
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Print a scope's `.scriptify` folder, creating it and its config if needed
pub fn folder_command(app: &App, global: bool) -> Result<()> {
    let config = ClientConfig::load(&app.roots, App::scope(global))?;
    println!("{}", config.root().display());
    Ok(())
}

/// Show the settings file
pub fn config_command(app: &App) -> Result<()> {
    println!("# {}", Settings::settings_path().display());
    println!(
        "{}",
        toml::to_string_pretty(&app.settings).context("Failed to serialize settings")?
    );
    println!("# global folder in use: {}", app.roots.global_folder().display());
    Ok(())
}

/// List or clear the recently used scripts
pub fn history_command(app: &App, clear: bool) -> Result<()> {
    let mut storage = app.storage();
    let history = app.history();

    if clear {
        history.clear(&mut storage)?;
        println!("Recent scripts cleared.");
        return Ok(());
    }

    let items = history.items(&storage);
    if items.is_empty() {
        println!("No recently used scripts.");
        return Ok(());
    }
    for (n, item) in items.iter().enumerate() {
        let name = item.description.as_deref().unwrap_or(&item.label);
        match item.last_used {
            Some(when) => println!(
                "{:>2}. {} ({}) - {}",
                n + 1,
                name,
                item.label,
                when.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            ),
            None => println!("{:>2}. {} ({})", n + 1, name, item.label),
        }
    }
    Ok(())
}
