//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use scriptify::apply::{EditorHost, ScriptPicker};
use scriptify::config::{CONFIG_FILE, ConfigScope, SCRIPTIFY_DIR, ScopeRoots};
use scriptify::sandbox::EditorContext;
use scriptify::script::ScriptDescriptor;

/// A temp directory holding a global folder and one project folder
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("project")).expect("Failed to create project");
        Self { dir }
    }

    pub fn global_folder(&self) -> PathBuf {
        self.dir.path().join("global")
    }

    pub fn project_folder(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    /// Global folder plus the single project root
    pub fn roots(&self) -> ScopeRoots {
        ScopeRoots::new(self.global_folder(), vec![self.project_folder()])
    }

    /// Global folder and no open workspace
    pub fn global_only(&self) -> ScopeRoots {
        ScopeRoots::new(self.global_folder(), Vec::new())
    }

    pub fn scope_dir(&self, scope: ConfigScope) -> PathBuf {
        match scope {
            ConfigScope::Global => self.global_folder().join(SCRIPTIFY_DIR),
            ConfigScope::Local => self.project_folder().join(SCRIPTIFY_DIR),
        }
    }

    /// Write `scriptify.json` for a scope
    pub fn write_config(&self, scope: ConfigScope, document: Value) {
        let path = self.scope_dir(scope).join(CONFIG_FILE);
        write_file(&path, &serde_json::to_string_pretty(&document).unwrap());
    }

    /// Write a package under `node_modules/<name>` of a scope
    pub fn write_package(
        &self,
        scope: ConfigScope,
        name: &str,
        manifest: Value,
        files: &[(&str, &str)],
    ) -> PathBuf {
        let root = self.scope_dir(scope).join("node_modules").join(name);
        write_file(
            &root.join("package.json"),
            &serde_json::to_string_pretty(&manifest).unwrap(),
        );
        for (relative, content) in files {
            write_file(&root.join(relative), content);
        }
        root
    }
}

pub fn write_file(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
    std::fs::write(path, content).expect("Failed to write file");
}

/// Editor host that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryEditor {
    pub selections: Vec<String>,
    pub replaced: Option<Vec<String>>,
    pub untitled: Vec<String>,
    pub language_id: Option<String>,
}

impl MemoryEditor {
    pub fn with_selections(selections: &[&str]) -> Self {
        Self {
            selections: selections.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl EditorHost for MemoryEditor {
    fn selections(&self) -> scriptify::Result<Vec<String>> {
        Ok(self.selections.clone())
    }

    fn document_info(&self) -> EditorContext {
        EditorContext {
            file_name: Some("memory.txt".to_string()),
            language_id: self.language_id.clone(),
            selection_count: self.selections.len(),
        }
    }

    fn replace_selections(&mut self, replacements: &[String]) -> scriptify::Result<()> {
        self.replaced = Some(replacements.to_vec());
        Ok(())
    }

    fn open_untitled(&mut self, content: &str) -> scriptify::Result<()> {
        self.untitled.push(content.to_string());
        Ok(())
    }
}

/// Picks a script by package name; records what it was offered
#[derive(Debug, Default)]
pub struct PickById {
    pub id: Option<String>,
    pub offered: Vec<String>,
}

impl PickById {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            offered: Vec::new(),
        }
    }

    pub fn dismiss() -> Self {
        Self::default()
    }
}

impl ScriptPicker for PickById {
    fn pick(&mut self, scripts: &[ScriptDescriptor]) -> scriptify::Result<Option<usize>> {
        self.offered = scripts.iter().map(|s| s.display_name.clone()).collect();
        Ok(self
            .id
            .as_ref()
            .and_then(|id| scripts.iter().position(|s| &s.id == id)))
    }
}
