//! Script pickers for the CLI: by name, or interactively on the terminal.
//! Both remember the picked script in the recent history.

use std::io::{BufRead, BufReader, Write};

use scriptify::apply::ScriptPicker;
use scriptify::script::ScriptDescriptor;
use scriptify::storage::{ClientStorage, RecentHistory, RecentItem};

/// History key of a script; unique across scopes
fn history_label(script: &ScriptDescriptor) -> String {
    format!("{}:{}", script.scope, script.id)
}

fn remember(storage: &mut ClientStorage, history: &RecentHistory, script: &ScriptDescriptor) {
    let item = RecentItem {
        label: history_label(script),
        description: Some(script.display_name.clone()),
        detail: script.description.clone(),
        last_used: None,
    };
    if let Err(e) = history.record(storage, item) {
        tracing::warn!("Failed to update recent scripts: {}", e);
    }
}

/// Picks the script whose package name or display name matches
pub struct NamedPicker {
    name: String,
    storage: ClientStorage,
    history: RecentHistory,
    suggestion: Option<String>,
}

impl NamedPicker {
    pub fn new(name: impl Into<String>, storage: ClientStorage, history: RecentHistory) -> Self {
        Self {
            name: name.into(),
            storage,
            history,
            suggestion: None,
        }
    }

    /// Closest known name when the requested one did not match
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }
}

impl ScriptPicker for NamedPicker {
    fn pick(&mut self, scripts: &[ScriptDescriptor]) -> scriptify::Result<Option<usize>> {
        let wanted = self.name.to_lowercase();
        let found = scripts
            .iter()
            .position(|s| s.id == self.name)
            .or_else(|| {
                scripts
                    .iter()
                    .position(|s| s.display_name.to_lowercase() == wanted)
            });

        match found {
            Some(index) => {
                remember(&mut self.storage, &self.history, &scripts[index]);
                Ok(Some(index))
            }
            None => {
                self.suggestion = closest_name(&self.name, scripts);
                Ok(None)
            }
        }
    }
}

/// Closest package or display name by Jaro-Winkler similarity
pub fn closest_name(name: &str, scripts: &[ScriptDescriptor]) -> Option<String> {
    let wanted = name.to_lowercase();
    scripts
        .iter()
        .flat_map(|s| [s.id.as_str(), s.display_name.as_str()])
        .map(|candidate| {
            let score = strsim::jaro_winkler(&wanted, &candidate.to_lowercase());
            (score, candidate)
        })
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Where the interactive choice is read from.
///
/// When stdin carries the document it is already drained, so the choice
/// comes from the controlling terminal instead.
pub fn choice_input(stdin_is_document: bool) -> std::io::Result<Box<dyn BufRead>> {
    if !stdin_is_document {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let terminal = std::fs::File::open(controlling_terminal())?;
    Ok(Box::new(BufReader::new(terminal)))
}

#[cfg(unix)]
fn controlling_terminal() -> &'static str {
    "/dev/tty"
}

#[cfg(windows)]
fn controlling_terminal() -> &'static str {
    "CONIN$"
}

/// Numbered list on stderr, choice read from `input`
pub struct TerminalPicker {
    storage: ClientStorage,
    history: RecentHistory,
    input: Box<dyn BufRead>,
}

impl TerminalPicker {
    pub fn new(storage: ClientStorage, history: RecentHistory, input: Box<dyn BufRead>) -> Self {
        Self {
            storage,
            history,
            input,
        }
    }

    /// Indices of `scripts` with recently used ones first
    fn ordered(&self, scripts: &[ScriptDescriptor]) -> Vec<usize> {
        let labels: Vec<String> = scripts.iter().map(history_label).collect();
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        self.history
            .arrange(&self.storage, &refs)
            .into_iter()
            .filter_map(|label| labels.iter().position(|l| l == label))
            .collect()
    }
}

impl ScriptPicker for TerminalPicker {
    fn pick(&mut self, scripts: &[ScriptDescriptor]) -> scriptify::Result<Option<usize>> {
        let order = self.ordered(scripts);

        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "Select a script:");
        for (n, &index) in order.iter().enumerate() {
            let script = &scripts[index];
            let _ = match &script.description {
                Some(desc) => writeln!(
                    stderr,
                    "  {:>2}) {} [{}] - {}",
                    n + 1,
                    script.display_name,
                    script.scope,
                    desc
                ),
                None => writeln!(
                    stderr,
                    "  {:>2}) {} [{}]",
                    n + 1,
                    script.display_name,
                    script.scope
                ),
            };
        }
        let _ = write!(stderr, "Number (empty to cancel): ");
        let _ = stderr.flush();
        drop(stderr);

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .map_err(|e| scriptify::ScriptifyError::Editor(format!("failed to read choice: {}", e)))?;

        let Some(index) = parse_choice(&line, order.len()).map(|n| order[n]) else {
            return Ok(None);
        };
        remember(&mut self.storage, &self.history, &scripts[index]);
        Ok(Some(index))
    }
}

/// 1-based choice into a 0-based position; anything else dismisses
fn parse_choice(line: &str, count: usize) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}
