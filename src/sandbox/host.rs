//! Native functions behind the sandbox's `scriptify` object
//!
//! Every native takes and returns strings. Arguments are JSON, replies are
//! `{"ok": value}` or `{"error": message}`; the prelude turns the latter
//! into a thrown `Error` inside the script.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rquickjs::{Ctx, Function, Object};
use serde::Deserialize;
use serde_json::{Value, json};

use super::loader;
use crate::installer::{InstallCommand, InstallOutcome, PackageManager, run_install};
use crate::output::LogSink;

/// Manifest written into the package cache so package managers install there
const CACHE_MANIFEST: &str = r#"{
    "name": "scriptify-packages",
    "private": true
}
"#;

/// Host capabilities handed to one sandbox
#[derive(Clone)]
pub(crate) struct HostBindings {
    pub log: Arc<dyn LogSink>,
    pub http: ureq::Agent,
    pub package_cache: PathBuf,
    pub package_manager: PackageManager,
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    from: String,
    request: String,
}

#[derive(Debug, Deserialize)]
struct HttpRequest {
    #[serde(default = "default_method")]
    method: String,
    url: String,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Deserialize)]
struct PackageRequest {
    name: String,
}

impl HostBindings {
    /// Build the native object the prelude wraps
    pub fn native_object<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
        let native = Object::new(ctx.clone())?;

        let log = self.log.clone();
        native.set(
            "log",
            Function::new(ctx.clone(), move |level: String, text: String| {
                write_log(log.as_ref(), &level, &text);
            })?,
        )?;

        native.set(
            "resolve",
            Function::new(ctx.clone(), |payload: String| -> String {
                reply(parse::<ResolveRequest>(&payload).and_then(|req| {
                    let module = loader::load(Path::new(&req.from), &req.request)?;
                    serde_json::to_value(module).map_err(|e| e.to_string())
                }))
            })?,
        )?;

        let agent = self.http.clone();
        native.set(
            "http",
            Function::new(ctx.clone(), move |payload: String| -> String {
                reply(parse::<HttpRequest>(&payload).and_then(|req| http_request(&agent, req)))
            })?,
        )?;

        let cache = self.package_cache.clone();
        let manager = self.package_manager;
        native.set(
            "pkgInstall",
            Function::new(ctx.clone(), move |payload: String| -> String {
                reply(
                    parse::<PackageRequest>(&payload)
                        .and_then(|req| install_package(&cache, manager, &req.name)),
                )
            })?,
        )?;

        Ok(native)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(payload: &str) -> Result<T, String> {
    serde_json::from_str(payload).map_err(|e| format!("invalid host call: {}", e))
}

fn reply(result: Result<Value, String>) -> String {
    match result {
        Ok(value) => json!({ "ok": value }),
        Err(message) => json!({ "error": message }),
    }
    .to_string()
}

fn write_log(sink: &dyn LogSink, level: &str, text: &str) {
    match level {
        "warn" => sink.append_line(&format!("[warn] {}", text)),
        "error" => sink.append_line(&format!("[error] {}", text)),
        _ => sink.append_line(text),
    }
}

/// Perform a request. Non-2xx statuses are responses, not errors.
fn http_request(agent: &ureq::Agent, req: HttpRequest) -> Result<Value, String> {
    tracing::debug!("Script HTTP {} {}", req.method, req.url);

    let mut request = agent.request(&req.method, &req.url);
    for (name, value) in &req.headers {
        request = request.set(name, value);
    }

    let result = match req.body.as_deref() {
        Some(body) => request.send_string(body),
        None => request.call(),
    };
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(e) => return Err(format!("{} {} failed: {}", req.method, req.url, e)),
    };

    let status = response.status();
    let status_text = response.status_text().to_string();
    let url = response.get_url().to_string();
    let headers: serde_json::Map<String, Value> = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, Value::String(value)))
        })
        .collect();
    let body = response
        .into_string()
        .map_err(|e| format!("failed to read response body: {}", e))?;

    Ok(json!({
        "status": status,
        "statusText": status_text,
        "url": url,
        "headers": headers,
        "body": body,
    }))
}

/// Install `name` into the shared package cache
fn install_package(cache: &Path, manager: PackageManager, name: &str) -> Result<Value, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("pkg.install needs a package name".to_string());
    }

    std::fs::create_dir_all(cache)
        .map_err(|e| format!("cannot create {}: {}", cache.display(), e))?;
    let manifest = cache.join("package.json");
    if !manifest.exists() {
        std::fs::write(&manifest, CACHE_MANIFEST)
            .map_err(|e| format!("cannot write {}: {}", manifest.display(), e))?;
    }

    tracing::info!("Installing {} into {}", name, cache.display());
    let command = InstallCommand::new(manager, name, cache);

    // A dedicated thread keeps this usable whether or not the caller is
    // already inside a tokio runtime.
    let outcome = std::thread::scope(|scope| {
        scope
            .spawn(|| {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(|e| format!("cannot start installer runtime: {}", e))?;
                runtime
                    .block_on(run_install(&command, std::future::pending::<()>()))
                    .map_err(|e| e.to_string())
            })
            .join()
            .map_err(|_| "package installer panicked".to_string())?
    })?;

    match outcome {
        InstallOutcome::Completed => Ok(json!({
            "name": name,
            "path": cache.join("node_modules").join(name).to_string_lossy(),
        })),
        InstallOutcome::Cancelled => Err(format!("installation of {} was cancelled", name)),
    }
}
