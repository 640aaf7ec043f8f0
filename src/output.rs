//! The Scriptify output channel
//!
//! Scripts and the host both write here: `scriptify.log(...)`, `console.*`
//! from inside the sandbox, full error reports, and transform results when a
//! script is configured with `"out": "outputChannel"`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only log channel
pub trait LogSink: Send + Sync {
    fn append(&self, text: &str);

    /// Append `text` followed by a line break
    fn append_line(&self, text: &str) {
        self.append(&format!("{}\n", text));
    }
}

/// Output channel backed by a log file, optionally echoed to stderr
pub struct OutputChannel {
    path: PathBuf,
    echo: bool,
    file_lock: Mutex<()>,
}

impl OutputChannel {
    /// File name of the channel's log inside the global `.scriptify` folder
    pub const LOG_FILE: &'static str = "output.log";

    pub fn new(path: impl Into<PathBuf>, echo: bool) -> Self {
        Self {
            path: path.into(),
            echo,
            file_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, text: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }
}

impl LogSink for OutputChannel {
    fn append(&self, text: &str) {
        if self.echo {
            eprint!("{}", text);
        }

        let _guard = self.file_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = self.write_file(text) {
            tracing::warn!("Failed to write output channel {}: {}", self.path.display(), e);
        }
    }
}

/// In-memory channel, used by tests and embedders that render output
/// themselves
#[derive(Default)]
pub struct MemorySink {
    buffer: Mutex<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl LogSink for MemorySink {
    fn append(&self, text: &str) {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_channel_appends() {
        let dir = TempDir::new().unwrap();
        let channel = OutputChannel::new(dir.path().join("logs/output.log"), false);

        channel.append_line("first");
        channel.append("second");

        let content = std::fs::read_to_string(channel.path()).unwrap();
        assert_eq!(content, "first\nsecond");
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.append_line("hello");
        assert_eq!(sink.contents(), "hello\n");
    }
}
