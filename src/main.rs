use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scriptify::installer::PackageManager;

mod cli;

#[derive(Parser)]
#[command(name = "scriptify")]
#[command(about = "Apply your own JavaScript transforms to text selections")]
#[command(version)]
struct Cli {
    /// Workspace folder; repeat for multi-root workspaces (defaults to the current directory)
    #[arg(short, long = "workspace", global = true)]
    workspace: Vec<PathBuf>,

    /// Folder holding the global .scriptify directory (overrides settings)
    #[arg(long, global = true)]
    global_folder: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the enabled scripts of both scopes
    List {
        #[arg(long)]
        json: bool,
    },

    /// Pick a script and apply it to a file or to stdin
    Apply {
        /// Script to run (package name or display name); prompts when omitted
        #[arg(short, long)]
        script: Option<String>,

        /// File to edit; reads stdin and writes stdout when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Byte range to transform, as START..END; repeat for several selections
        #[arg(short, long = "range")]
        range: Vec<String>,

        /// Language id reported to scripts (guessed from the file extension otherwise)
        #[arg(long)]
        language: Option<String>,
    },

    /// Install a script package from the registry and enable it
    Install {
        /// Package name, e.g. @scriptify-vscode/sort-json
        package: String,

        /// Install into the global folder instead of the workspace
        #[arg(short, long)]
        global: bool,

        /// Package manager to use (overrides settings)
        #[arg(long)]
        package_manager: Option<PackageManager>,
    },

    /// Search the registry for published scripts
    Search {
        keyword: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Create a new script from the template
    Create {
        name: String,

        #[arg(short, long)]
        global: bool,

        /// Overwrite an existing index.js
        #[arg(long)]
        force: bool,
    },

    /// Disable a script and delete its files
    Remove {
        /// Package name of the script
        id: String,

        #[arg(short, long)]
        global: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the .scriptify folder of a scope, creating it if needed
    Folder {
        #[arg(short, long)]
        global: bool,
    },

    /// Show the settings file and its values
    Config,

    /// Show or clear the recently used scripts
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let app = cli::App::load(cli.workspace, cli.global_folder)?;

    match cli.command {
        Commands::List { json } => {
            cli::list::list_command(&app, json)?;
        }
        Commands::Apply {
            script,
            file,
            range,
            language,
        } => {
            let args = cli::apply::ApplyArgs {
                script,
                file,
                ranges: range,
                language,
            };
            cli::apply::apply_command(&app, args).await?;
        }
        Commands::Install {
            package,
            global,
            package_manager,
        } => {
            cli::install::install_command(&app, &package, global, package_manager).await?;
        }
        Commands::Search { keyword, json } => {
            cli::install::search_command(&app, keyword, json).await?;
        }
        Commands::Create {
            name,
            global,
            force,
        } => {
            cli::manage::create_command(&app, &name, global, force)?;
        }
        Commands::Remove { id, global, yes } => {
            cli::manage::remove_command(&app, &id, global, yes)?;
        }
        Commands::Folder { global } => {
            cli::manage::folder_command(&app, global)?;
        }
        Commands::Config => {
            cli::manage::config_command(&app)?;
        }
        Commands::History { clear } => {
            cli::manage::history_command(&app, clear)?;
        }
    }

    Ok(())
}
