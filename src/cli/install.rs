//! `scriptify install` and `scriptify search`

use anyhow::{Context, Result};

use super::App;
use scriptify::installer::{InstallReport, PackageManager, RegistryClient, install_and_register};

/// Install a package into a scope and enable it. Ctrl-C cancels.
pub async fn install_command(
    app: &App,
    package: &str,
    global: bool,
    package_manager: Option<PackageManager>,
) -> Result<()> {
    let scope = App::scope(global);
    let manager = package_manager.unwrap_or(app.settings.favorite_package_manager);

    println!("Installing {} ({} scope, {})...", package, scope, manager);

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler; never cancel
            std::future::pending::<()>().await;
        }
    };

    let report = install_and_register(&app.roots, scope, manager, package, cancel)
        .await
        .with_context(|| format!("Failed to install {}", package))?;

    match report {
        InstallReport::Completed(installed) => {
            println!("✓ Installed {}", installed.package);
            println!("  {}", installed.module_root.display());
            if let Some(env) = installed.entry.env.as_ref().filter(|env| !env.is_empty()) {
                println!();
                println!("Environment seeded from the package (edit it in scriptify.json):");
                for (key, value) in env {
                    println!("  {} = {}", key, value);
                }
            }
            if let Some(readme) = installed.readme {
                println!();
                println!("Read more: {}", readme.display());
            }
        }
        InstallReport::Cancelled => {
            println!("Installation cancelled.");
        }
    }

    Ok(())
}

/// Search the registry scope for scripts
pub async fn search_command(app: &App, keyword: Option<String>, json: bool) -> Result<()> {
    let client = RegistryClient::from_settings(&app.settings);
    let query = keyword.clone();
    let packages = tokio::task::spawn_blocking(move || client.search(query.as_deref()))
        .await
        .context("Registry search task failed")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    let matching = keyword
        .as_deref()
        .map(|k| format!(" matching '{}'", k))
        .unwrap_or_default();

    if packages.is_empty() {
        println!("No scripts found{}.", matching);
        return Ok(());
    }

    println!("Found {} script(s){}:\n", packages.len(), matching);
    for package in &packages {
        println!("  {}", package.display_line());
        if let Some(author) = package.author.as_ref().and_then(|a| a.name.as_deref()) {
            println!("    by {}", author);
        }
    }
    println!();
    println!("Install a script with:");
    println!("  scriptify install <package> [--global]");

    Ok(())
}
