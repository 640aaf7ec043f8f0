//! File-backed editor host for the CLI
//!
//! Selections are byte ranges of a file (or the whole input). Replacements
//! are written back in one atomic rename; untitled documents become temp
//! files whose paths are printed.

use std::io::{Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use scriptify::ScriptifyError;
use scriptify::apply::EditorHost;
use scriptify::sandbox::EditorContext;

/// Where the document came from and where edits go
#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    Stdio,
}

pub struct FileEditor {
    target: Target,
    text: String,
    ranges: Vec<Range<usize>>,
    language_id: Option<String>,
    untitled: Vec<PathBuf>,
}

impl FileEditor {
    /// Open `path`, or read stdin when `None`
    pub fn open(path: Option<&Path>, ranges: &[String], language: Option<String>) -> Result<Self> {
        let (target, text) = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                (Target::File(path.to_path_buf()), text)
            }
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                (Target::Stdio, text)
            }
        };

        let ranges = if ranges.is_empty() {
            vec![0..text.len()]
        } else {
            let parsed = ranges
                .iter()
                .map(String::as_str)
                .map(parse_range)
                .collect::<Result<Vec<_>>>()?;
            validate_ranges(&text, parsed)?
        };

        let language_id = language.or_else(|| path.and_then(guess_language));

        Ok(Self {
            target,
            text,
            ranges,
            language_id,
            untitled: Vec::new(),
        })
    }

    /// Temp files written for untitled documents
    pub fn untitled(&self) -> &[PathBuf] {
        &self.untitled
    }

    fn file_name(&self) -> Option<String> {
        match &self.target {
            Target::File(path) => Some(path.display().to_string()),
            Target::Stdio => None,
        }
    }
}

impl EditorHost for FileEditor {
    fn selections(&self) -> scriptify::Result<Vec<String>> {
        Ok(self
            .ranges
            .iter()
            .map(|r| self.text[r.clone()].to_string())
            .collect())
    }

    fn document_info(&self) -> EditorContext {
        EditorContext {
            file_name: self.file_name(),
            language_id: self.language_id.clone(),
            selection_count: self.ranges.len(),
        }
    }

    fn replace_selections(&mut self, replacements: &[String]) -> scriptify::Result<()> {
        if replacements.len() != self.ranges.len() {
            return Err(ScriptifyError::Editor(format!(
                "expected {} replacements, got {}",
                self.ranges.len(),
                replacements.len()
            )));
        }

        let edited = splice(&self.text, &self.ranges, replacements);

        match &self.target {
            Target::File(path) => write_atomic(path, &edited)?,
            Target::Stdio => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(edited.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| ScriptifyError::Editor(format!("failed to write stdout: {}", e)))?;
            }
        }

        self.text = edited;
        Ok(())
    }

    fn open_untitled(&mut self, content: &str) -> scriptify::Result<()> {
        let path = std::env::temp_dir().join(format!("scriptify-untitled-{}.txt", Uuid::new_v4()));
        std::fs::write(&path, content).map_err(|e| ScriptifyError::io(&path, e))?;
        println!("{}", path.display());
        self.untitled.push(path);
        Ok(())
    }
}

/// Parse `START..END` byte offsets
pub fn parse_range(value: &str) -> Result<Range<usize>> {
    let (start, end) = value
        .split_once("..")
        .with_context(|| format!("Invalid range \"{}\": expected START..END", value))?;
    let start: usize = start
        .trim()
        .parse()
        .with_context(|| format!("Invalid range start in \"{}\"", value))?;
    let end: usize = end
        .trim()
        .parse()
        .with_context(|| format!("Invalid range end in \"{}\"", value))?;
    if start > end {
        anyhow::bail!("Invalid range \"{}\": start is after end", value);
    }
    Ok(start..end)
}

/// Sort ranges and check they fit the text without overlapping
fn validate_ranges(text: &str, mut ranges: Vec<Range<usize>>) -> Result<Vec<Range<usize>>> {
    ranges.sort_by_key(|r| r.start);

    for range in &ranges {
        if range.end > text.len() {
            anyhow::bail!(
                "Range {}..{} is outside the document ({} bytes)",
                range.start,
                range.end,
                text.len()
            );
        }
        if !text.is_char_boundary(range.start) || !text.is_char_boundary(range.end) {
            anyhow::bail!(
                "Range {}..{} splits a UTF-8 character",
                range.start,
                range.end
            );
        }
    }
    for pair in ranges.windows(2) {
        if pair[1].start < pair[0].end {
            anyhow::bail!(
                "Ranges {}..{} and {}..{} overlap",
                pair[0].start,
                pair[0].end,
                pair[1].start,
                pair[1].end
            );
        }
    }
    Ok(ranges)
}

/// Replace sorted, disjoint `ranges` of `text`
fn splice(text: &str, ranges: &[Range<usize>], replacements: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, replacement) in ranges.iter().zip(replacements) {
        out.push_str(&text[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn write_atomic(path: &Path, content: &str) -> scriptify::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let tmp = path.with_file_name(format!(".{}.scriptify-{}", file_name, Uuid::new_v4()));

    std::fs::write(&tmp, content).map_err(|e| ScriptifyError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ScriptifyError::io(path, e)
    })
}

/// Language id from a file extension, using editor-style identifiers
fn guess_language(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let id = match ext.as_str() {
        "js" | "cjs" | "mjs" => "javascript",
        "ts" | "mts" | "cts" => "typescript",
        "jsx" => "javascriptreact",
        "tsx" => "typescriptreact",
        "json" => "json",
        "md" | "markdown" => "markdown",
        "rs" => "rust",
        "py" => "python",
        "go" => "go",
        "html" | "htm" => "html",
        "css" => "css",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "sh" | "bash" => "shellscript",
        "sql" => "sql",
        "xml" => "xml",
        "txt" => "plaintext",
        other => other,
    };
    Some(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("3..7").unwrap(), 3..7);
        assert!(parse_range("7..3").is_err());
        assert!(parse_range("3-7").is_err());
    }

    #[test]
    fn test_validate_ranges() {
        let text = "héllo world";
        assert_eq!(
            validate_ranges(text, vec![7..12, 0..1]).unwrap(),
            vec![0..1, 7..12]
        );
        assert!(validate_ranges(text, vec![0..2]).is_err());
        assert!(validate_ranges(text, vec![0..5, 4..6]).is_err());
        assert!(validate_ranges(text, vec![0..99]).is_err());
    }

    #[test]
    fn test_replace_selections_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "alpha beta gamma").unwrap();

        let ranges = vec!["0..5".to_string(), "11..16".to_string()];
        let mut editor = FileEditor::open(Some(&path), &ranges, None).unwrap();
        assert_eq!(editor.selections().unwrap(), vec!["alpha", "gamma"]);
        assert_eq!(
            editor.document_info().language_id.as_deref(),
            Some("markdown")
        );

        editor
            .replace_selections(&["A".to_string(), "G".to_string()])
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A beta G");
    }

    #[test]
    fn test_replacement_count_must_match() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();

        let mut editor = FileEditor::open(Some(&path), &[], None).unwrap();
        assert!(editor.replace_selections(&[]).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
    }

    #[test]
    fn test_open_untitled_writes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();

        let mut editor = FileEditor::open(Some(&path), &[], None).unwrap();
        editor.open_untitled("result").unwrap();

        let written = &editor.untitled()[0];
        assert_eq!(std::fs::read_to_string(written).unwrap(), "result");
        std::fs::remove_file(written).unwrap();
    }
}
