//! CommonJS module resolution for sandboxed scripts
//!
//! Only files reachable through relative paths, absolute paths and
//! `node_modules` folders can be loaded. Host runtime modules that would hand
//! out a capability (`fs`, `child_process`, `net`, ...) are refused, as is
//! any other `node:*` name. The capability-free ones (`path`, `util`, ...)
//! are answered by the prelude and never get here.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Extensions tried, in order, when a request names a file without one
const EXTENSIONS: &[&str] = &["js", "json", "cjs"];

/// Host runtime modules that stay out of the sandbox
const HOST_MODULES: &[&str] = &[
    "buffer",
    "child_process",
    "cluster",
    "crypto",
    "dgram",
    "dns",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "module",
    "net",
    "os",
    "process",
    "readline",
    "stream",
    "tls",
    "tty",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ModuleKind {
    Js,
    Json,
}

/// A resolved module, handed to the in-sandbox loader
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ResolvedModule {
    pub filename: String,
    pub dirname: String,
    pub kind: ModuleKind,
    pub source: String,
}

/// Resolve `request` as seen from a module located in `from_dir` and read it
pub(crate) fn load(from_dir: &Path, request: &str) -> Result<ResolvedModule, String> {
    let path = resolve(from_dir, request)?;
    let source = std::fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read module '{}': {}", path.display(), e))?;

    let kind = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ModuleKind::Json,
        _ => ModuleKind::Js,
    };
    let dirname = path.parent().unwrap_or(Path::new("/")).to_path_buf();

    Ok(ResolvedModule {
        filename: path.to_string_lossy().into_owned(),
        dirname: dirname.to_string_lossy().into_owned(),
        kind,
        source,
    })
}

/// Resolve `request` to a file path
pub(crate) fn resolve(from_dir: &Path, request: &str) -> Result<PathBuf, String> {
    if request.is_empty() {
        return Err("Cannot require an empty module name".to_string());
    }

    if is_host_module(request) {
        return Err(format!(
            "Module '{}' is not available inside the Scriptify sandbox",
            request
        ));
    }

    let found = if is_path_request(request) {
        let base = from_dir.join(request);
        resolve_file(&base).or_else(|| resolve_directory(&base))
    } else {
        resolve_node_modules(from_dir, request)
    };

    found
        .map(|p| p.canonicalize().unwrap_or(p))
        .ok_or_else(|| {
            format!(
                "Cannot find module '{}' from '{}'",
                request,
                from_dir.display()
            )
        })
}

fn is_host_module(request: &str) -> bool {
    request.starts_with("node:") || HOST_MODULES.contains(&request)
}

fn is_path_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

fn resolve_file(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    EXTENSIONS.iter().find_map(|ext| {
        let mut name = base.as_os_str().to_os_string();
        name.push(".");
        name.push(ext);
        let candidate = PathBuf::from(name);
        candidate.is_file().then_some(candidate)
    })
}

fn resolve_index(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("index.{}", ext)))
        .find(|p| p.is_file())
}

fn resolve_directory(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let main = std::fs::read_to_string(dir.join("package.json"))
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|manifest| manifest.get("main")?.as_str().map(str::to_string))
        .filter(|main| !main.is_empty());

    if let Some(main) = main {
        let target = dir.join(main);
        if let Some(found) = resolve_file(&target).or_else(|| resolve_index(&target)) {
            return Some(found);
        }
    }

    resolve_index(dir)
}

fn resolve_node_modules(from_dir: &Path, request: &str) -> Option<PathBuf> {
    from_dir
        .ancestors()
        .filter(|dir| dir.file_name().is_none_or(|name| name != "node_modules"))
        .find_map(|dir| {
            let base = dir.join("node_modules").join(request);
            resolve_file(&base).or_else(|| resolve_directory(&base))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_relative_with_and_without_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("lib/util.js"), "module.exports = 1;");
        write(&dir.path().join("data.json"), "{}");

        let util = resolve(dir.path(), "./lib/util").unwrap();
        assert!(util.ends_with("lib/util.js"));
        let data = resolve(dir.path(), "./data.json").unwrap();
        assert!(data.ends_with("data.json"));
    }

    #[test]
    fn test_directory_uses_package_main_then_index() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("with-main/package.json"),
            r#"{"main": "dist/entry.js"}"#,
        );
        write(&dir.path().join("with-main/dist/entry.js"), "");
        write(&dir.path().join("plain/index.js"), "");

        assert!(
            resolve(dir.path(), "./with-main")
                .unwrap()
                .ends_with("dist/entry.js")
        );
        assert!(resolve(dir.path(), "./plain").unwrap().ends_with("index.js"));
    }

    #[test]
    fn test_node_modules_walks_up() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("node_modules/left-pad/package.json"),
            r#"{"name": "left-pad", "main": "lib.js"}"#,
        );
        write(&dir.path().join("node_modules/left-pad/lib.js"), "");
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let found = resolve(&nested, "left-pad").unwrap();
        assert!(found.ends_with("node_modules/left-pad/lib.js"));
    }

    #[test]
    fn test_host_modules_refused() {
        let dir = TempDir::new().unwrap();
        for request in ["fs", "node:fs", "child_process"] {
            let err = resolve(dir.path(), request).unwrap_err();
            assert!(err.contains("not available"), "{}", err);
        }
    }

    #[test]
    fn test_missing_module_message() {
        let dir = TempDir::new().unwrap();
        let err = resolve(dir.path(), "./nope").unwrap_err();
        assert!(err.starts_with("Cannot find module './nope'"));
    }

    #[test]
    fn test_load_reports_kind() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("cfg.json"), r#"{"a": 1}"#);

        let module = load(dir.path(), "./cfg").unwrap();
        assert_eq!(module.kind, ModuleKind::Json);
        assert_eq!(module.source, r#"{"a": 1}"#);
    }
}
