//! `scriptify apply`

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::App;
use super::editor::FileEditor;
use super::picker::{NamedPicker, TerminalPicker, choice_input};
use scriptify::apply::{ApplyOrchestrator, ApplyOutcome};
use scriptify::config::OutputLocation;
use scriptify::sandbox::SandboxRunner;

#[derive(Debug, Clone, Default)]
pub struct ApplyArgs {
    pub script: Option<String>,
    pub file: Option<PathBuf>,
    pub ranges: Vec<String>,
    pub language: Option<String>,
}

/// Apply a script to a file's selections, or to stdin
pub async fn apply_command(app: &App, args: ApplyArgs) -> Result<()> {
    let mut editor = FileEditor::open(args.file.as_deref(), &args.ranges, args.language)?;

    let runner = SandboxRunner::new(&app.roots, app.output.clone())
        .with_package_manager(app.settings.favorite_package_manager);
    let orchestrator = ApplyOrchestrator::new(app.roots.clone(), runner, app.output.clone());

    let outcome = match args.script {
        Some(name) => {
            let mut picker = NamedPicker::new(&name, app.storage(), app.history());
            let outcome = orchestrator.apply(&mut editor, &mut picker).await?;
            if outcome == ApplyOutcome::Dismissed {
                match picker.suggestion() {
                    Some(suggestion) => {
                        anyhow::bail!("No script named \"{}\". Did you mean \"{}\"?", name, suggestion)
                    }
                    None => anyhow::bail!(
                        "No script named \"{}\". Run `scriptify list` to see enabled scripts.",
                        name
                    ),
                }
            }
            outcome
        }
        None => {
            let input = choice_input(args.file.is_none()).context(
                "The document is read from stdin and no terminal is available to pick a script; pass --script NAME or --file PATH",
            )?;
            let mut picker = TerminalPicker::new(app.storage(), app.history(), input);
            orchestrator.apply(&mut editor, &mut picker).await?
        }
    };

    match outcome {
        ApplyOutcome::Applied {
            script,
            location,
            results,
        } => {
            let target = match &location {
                OutputLocation::Selection => "selection",
                OutputLocation::File => "new document",
                OutputLocation::OutputChannel => "output channel",
                OutputLocation::Other(_) => "nowhere",
            };
            tracing::info!("{} applied to {} selection(s), output: {}", script, results, target);
            if !editor.untitled().is_empty() {
                eprintln!("{} new document(s) written", editor.untitled().len());
            }
        }
        ApplyOutcome::NoScripts => {
            eprintln!("No scripts found. Create one with `scriptify create <name>` or install one with `scriptify install <package>`.");
        }
        ApplyOutcome::Dismissed => {
            eprintln!("Cancelled.");
        }
    }

    Ok(())
}
