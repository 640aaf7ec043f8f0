//! Applying a script to the current selections
//!
//! One apply walks through [`ApplyPhase`]s in order: resolve the enabled
//! scripts, let the user pick one, read its source, evaluate it in a fresh
//! sandbox, run the transform over every selection, then commit the results.
//! Any failure ends the run in `Failed`; nothing is retried and nothing is
//! committed.

mod host;

pub use host::{EditorHost, ScriptPicker};

use std::sync::Arc;

use crate::config::{OutputLocation, ScopeRoots};
use crate::error::{Result, ScriptifyError};
use crate::output::LogSink;
use crate::sandbox::SandboxRunner;
use crate::script::get_all_script_files;

/// Progress of one apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyPhase {
    Idle,
    Resolving,
    Selecting,
    Loading,
    Sandboxing,
    Transforming,
    Committing,
    Done,
    Failed,
}

impl ApplyPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyPhase::Idle => "idle",
            ApplyPhase::Resolving => "resolving",
            ApplyPhase::Selecting => "selecting",
            ApplyPhase::Loading => "loading",
            ApplyPhase::Sandboxing => "sandboxing",
            ApplyPhase::Transforming => "transforming",
            ApplyPhase::Committing => "committing",
            ApplyPhase::Done => "done",
            ApplyPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ApplyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an apply ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        script: String,
        location: OutputLocation,
        results: usize,
    },
    /// No enabled script in any scope
    NoScripts,
    /// The picker was dismissed
    Dismissed,
}

/// Runs the resolve → pick → sandbox → commit pipeline
pub struct ApplyOrchestrator {
    roots: ScopeRoots,
    runner: SandboxRunner,
    log: Arc<dyn LogSink>,
}

impl ApplyOrchestrator {
    pub fn new(roots: ScopeRoots, runner: SandboxRunner, log: Arc<dyn LogSink>) -> Self {
        Self { roots, runner, log }
    }

    /// Run one apply. Failures are written in full to the output channel
    /// before being returned.
    pub async fn apply<E, P>(&self, editor: &mut E, picker: &mut P) -> Result<ApplyOutcome>
    where
        E: EditorHost,
        P: ScriptPicker,
    {
        enter(ApplyPhase::Idle);
        match self.run(editor, picker).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                enter(ApplyPhase::Failed);
                tracing::error!("Apply failed: {}", e);
                self.log.append_line(&format!("Error: {}", e));
                Err(e)
            }
        }
    }

    async fn run<E, P>(&self, editor: &mut E, picker: &mut P) -> Result<ApplyOutcome>
    where
        E: EditorHost,
        P: ScriptPicker,
    {
        enter(ApplyPhase::Resolving);
        let scripts = get_all_script_files(&self.roots)?;
        if scripts.is_empty() {
            tracing::info!("No scripts enabled");
            return Ok(ApplyOutcome::NoScripts);
        }

        enter(ApplyPhase::Selecting);
        let Some(index) = picker.pick(&scripts)? else {
            return Ok(ApplyOutcome::Dismissed);
        };
        let script = scripts.get(index).cloned().ok_or_else(|| {
            ScriptifyError::Editor(format!("picker returned unknown script index {}", index))
        })?;
        tracing::info!("Applying {} ({} scope)", script.display_name, script.scope);

        enter(ApplyPhase::Loading);
        let source = tokio::fs::read_to_string(&script.entry_path)
            .await
            .map_err(|e| ScriptifyError::io(&script.entry_path, e))?;
        let selections = editor.selections()?;
        let document = editor.document_info();
        let location = script.module_config.output_location();
        let module_config = script.module_config.to_json();

        // The interpreter is single-threaded and blocking
        let runner = self.runner.clone();
        let file = script.entry_path.display().to_string();
        let results = tokio::task::spawn_blocking(move || {
            enter(ApplyPhase::Sandboxing);
            let transform = runner.execute_with(&source, &script, &document)?;
            enter(ApplyPhase::Transforming);
            transform.apply_all(&selections, &module_config)
        })
        .await
        .map_err(|e| ScriptifyError::SandboxRuntime {
            file,
            message: format!("sandbox worker stopped: {}", e),
        })??;

        enter(ApplyPhase::Committing);
        self.commit(editor, &location, &results)?;

        enter(ApplyPhase::Done);
        Ok(ApplyOutcome::Applied {
            script: scripts[index].id.clone(),
            location,
            results: results.len(),
        })
    }

    fn commit<E: EditorHost>(
        &self,
        editor: &mut E,
        location: &OutputLocation,
        results: &[String],
    ) -> Result<()> {
        match location {
            OutputLocation::Selection => editor.replace_selections(results),
            OutputLocation::File => {
                for result in results {
                    editor.open_untitled(result)?;
                }
                Ok(())
            }
            OutputLocation::OutputChannel => {
                for result in results {
                    self.log.append_line(result);
                }
                Ok(())
            }
            OutputLocation::Other(other) => {
                tracing::warn!("Unknown output location \"{}\", results dropped", other);
                Ok(())
            }
        }
    }
}

fn enter(phase: ApplyPhase) {
    tracing::debug!(phase = %phase, "apply phase");
}
