//! Sandboxed script execution on QuickJS
//!
//! Every [`SandboxRunner::execute`] call builds a fresh runtime and context.
//! Scripts see only what the prelude installs: the `scriptify` capability
//! object, `console`, `process.env`/`process.argv`, timers, `fetch` and a
//! CommonJS `require` that can load files and `node_modules` packages. Of the
//! host runtime's modules only capability-free ones (`path`, `events`,
//! `util`, `url`, `assert`) exist, as in-sandbox shims.
//!
//! The evaluated export is kept as a [`Transform`] handle. Running it starts
//! one call per selection in the interpreter's job queue, then drives the
//! queue (and the timer queue) until the joined promise settles.

mod host;
mod loader;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rquickjs::{Context, Ctx, Function, Object, Runtime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::ScopeRoots;
use crate::error::{Result, ScriptifyError};
use crate::installer::PackageManager;
use crate::output::LogSink;
use crate::script::ScriptDescriptor;
use host::HostBindings;

const PRELUDE: &str = include_str!("prelude.js");
const NODE_SHIMS: &str = include_str!("node_shims.js");

/// Global the prelude stores its host hooks under
const HOOKS_GLOBAL: &str = "__scriptifyHost";

/// Read-only view of the active document exposed as `scriptify.editor`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContext {
    pub file_name: Option<String>,
    pub language_id: Option<String>,
    pub selection_count: usize,
}

/// Builds sandboxes for scripts
#[derive(Clone)]
pub struct SandboxRunner {
    log: Arc<dyn LogSink>,
    http: ureq::Agent,
    package_cache: PathBuf,
    package_manager: PackageManager,
    workspace: std::result::Result<PathBuf, String>,
}

impl SandboxRunner {
    pub fn new(roots: &ScopeRoots, log: Arc<dyn LogSink>) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(60))
            .build();

        Self {
            log,
            http,
            package_cache: roots.package_cache(),
            package_manager: PackageManager::default(),
            workspace: roots
                .workspace_folder()
                .map(PathBuf::from)
                .map_err(|e| e.to_string()),
        }
    }

    /// Package manager used by `scriptify.pkg.install`
    pub fn with_package_manager(mut self, manager: PackageManager) -> Self {
        self.package_manager = manager;
        self
    }

    /// Evaluate `source` as the script described by `script`
    pub fn execute(&self, source: &str, script: &ScriptDescriptor) -> Result<Transform> {
        self.execute_with(source, script, &EditorContext::default())
    }

    /// Like [`execute`](Self::execute) with the active document's details
    pub fn execute_with(
        &self,
        source: &str,
        script: &ScriptDescriptor,
        editor: &EditorContext,
    ) -> Result<Transform> {
        let file = script.entry_path.display().to_string();
        let failed = |message: String| ScriptifyError::SandboxRuntime {
            file: file.clone(),
            message,
        };

        let runtime = Runtime::new()
            .map_err(|e| failed(format!("failed to create QuickJS runtime: {}", e)))?;
        let context = Context::full(&runtime)
            .map_err(|e| failed(format!("failed to create QuickJS context: {}", e)))?;

        let bindings = HostBindings {
            log: self.log.clone(),
            http: self.http.clone(),
            package_cache: self.package_cache.clone(),
            package_manager: self.package_manager,
        };
        let meta = self.metadata(script, editor).to_string();

        context.with(|ctx| {
            let setup = || -> rquickjs::Result<()> {
                let native = bindings.native_object(&ctx)?;
                let shims: Function = ctx.eval(NODE_SHIMS)?;
                let prelude: Function = ctx.eval(PRELUDE)?;
                prelude.call::<_, Object>((native, meta, shims))?;
                Ok(())
            };
            setup().map_err(|e| failed(describe_js_error(&ctx, e)))
        })?;

        let wrapper_source = format!(
            "(function (exports, require, module, __filename, __dirname) {{{}\n}})",
            strip_shebang(source)
        );
        let filename = script.entry_path.to_string_lossy().into_owned();
        let dirname = script
            .entry_path
            .parent()
            .unwrap_or(&script.module_root)
            .to_string_lossy()
            .into_owned();

        context.with(|ctx| {
            let wrapper: Function = ctx.eval(wrapper_source).map_err(|e| {
                ScriptifyError::SandboxCompile {
                    file: file.clone(),
                    message: describe_js_error(&ctx, e),
                }
            })?;

            let run_main = || -> rquickjs::Result<()> {
                let hook: Function = hooks(&ctx)?.get("runMain")?;
                hook.call::<_, ()>((wrapper, filename, dirname))
            };
            run_main().map_err(|e| failed(describe_js_error(&ctx, e)))
        })?;

        tracing::debug!("Evaluated {} in a fresh sandbox", file);

        let transform = Transform {
            file,
            context,
            runtime,
        };
        transform.drain_jobs();
        Ok(transform)
    }

    fn metadata(&self, script: &ScriptDescriptor, editor: &EditorContext) -> Value {
        let (workspace_folder, workspace_error) = match &self.workspace {
            Ok(path) => (Some(path.to_string_lossy().into_owned()), None),
            Err(message) => (None, Some(message.clone())),
        };

        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspaceFolder": workspace_folder,
            "workspaceError": workspace_error,
            "editor": editor,
            "env": script_env(script),
            "argv": [script.scope_root.to_string_lossy()],
            "platform": platform(),
            "packagesPath": self.package_cache.to_string_lossy(),
        })
    }
}

/// `process.env` for a script: the manifest's declared default environment
/// overlaid with the module config's `env`. Non-string values are given as
/// their JSON text.
pub fn script_env(script: &ScriptDescriptor) -> Map<String, Value> {
    let defaults = script.manifest.default_env().into_iter().flatten();
    let configured = script.module_config.env.iter().flatten();

    defaults
        .chain(configured)
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), Value::String(text))
        })
        .collect()
}

fn platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

fn strip_shebang(source: &str) -> &str {
    if source.starts_with("#!") {
        // Keep the line break so line numbers stay aligned
        source.find('\n').map(|i| &source[i..]).unwrap_or("")
    } else {
        source
    }
}

fn hooks<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
    ctx.globals().get(HOOKS_GLOBAL)
}

/// Human-readable message of a JS failure, including the stack when present
fn describe_js_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> String {
    if !err.is_exception() {
        return err.to_string();
    }

    let exception = ctx.catch();
    if let Some(object) = exception.as_object() {
        let name: String = object
            .get("name")
            .unwrap_or_else(|_| "Error".to_string());
        let message: String = object.get("message").unwrap_or_default();
        let stack: String = object.get("stack").unwrap_or_default();
        let head = format!("{}: {}", name, message);
        return if stack.trim().is_empty() {
            head
        } else {
            format!("{}\n{}", head, stack.trim_end())
        };
    }

    exception
        .as_string()
        .and_then(|s| s.to_string().ok())
        .unwrap_or_else(|| "uncaught exception".to_string())
}

#[derive(Debug, Deserialize)]
struct BatchState {
    done: bool,
    #[serde(default)]
    results: Option<Vec<String>>,
    #[serde(default)]
    failure: Option<BatchFailure>,
}

#[derive(Debug, Deserialize)]
struct BatchFailure {
    index: usize,
    message: String,
}

/// A script's exported transform function, bound to its own sandbox
pub struct Transform {
    file: String,
    context: Context,
    runtime: Runtime,
}

impl Transform {
    /// The script's entry file
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Call the transform once per selection, all started before any is
    /// awaited, and join the results.
    ///
    /// Each call gets `(text, index, module_config)`. A string result is kept
    /// as-is, other values are converted with `String(...)`; `null` and
    /// `undefined` are failures. The first failure fails the whole batch.
    pub fn apply_all(&self, selections: &[String], module_config: &Value) -> Result<Vec<String>> {
        let inputs = serde_json::to_string(selections).map_err(|e| self.failed(e.to_string()))?;
        let config = module_config.to_string();

        let batch: f64 = self.call_hook("startBatch", (inputs, config))?;

        loop {
            self.drain_jobs();

            let state: Option<BatchState> = {
                let raw: String = self.call_hook("batchState", (batch,))?;
                serde_json::from_str(&raw).map_err(|e| self.failed(e.to_string()))?
            };
            let Some(state) = state else {
                return Err(self.failed("transform batch was not started".to_string()));
            };

            if state.done {
                if let Some(failure) = state.failure {
                    return Err(ScriptifyError::TransformBatch {
                        index: failure.index,
                        message: failure.message,
                    });
                }
                let results = state.results.unwrap_or_default();
                if results.len() != selections.len() {
                    return Err(self.failed(format!(
                        "transform produced {} results for {} selections",
                        results.len(),
                        selections.len()
                    )));
                }
                return Ok(results);
            }

            let delay: f64 = self.call_hook("nextTimerDelay", ())?;
            if delay < 0.0 {
                return Err(self.failed(
                    "transform never settled: a promise is pending with no timers left"
                        .to_string(),
                ));
            }
            if delay > 0.0 {
                std::thread::sleep(Duration::from_millis(delay as u64));
            }
            self.call_hook::<_, ()>("fireTimers", ())?;
        }
    }

    fn call_hook<A, R>(&self, name: &str, args: A) -> Result<R>
    where
        A: for<'js> rquickjs::function::IntoArgs<'js>,
        R: for<'js> rquickjs::FromJs<'js>,
    {
        self.context.with(|ctx| {
            let call = || -> rquickjs::Result<R> {
                let hook: Function = hooks(&ctx)?.get(name)?;
                hook.call(args)
            };
            call().map_err(|e| self.failed(describe_js_error(&ctx, e)))
        })
    }

    /// Run queued promise jobs until none are left
    fn drain_jobs(&self) {
        while self.runtime.is_job_pending() {
            match self.runtime.execute_pending_job() {
                Ok(true) => {}
                Ok(false) => break,
                Err(_) => tracing::debug!("A promise job in {} threw", self.file),
            }
        }
    }

    fn failed(&self, message: String) -> ScriptifyError {
        ScriptifyError::SandboxRuntime {
            file: self.file.clone(),
            message,
        }
    }
}
