//! What the orchestrator needs from the surrounding editor

use crate::error::Result;
use crate::sandbox::EditorContext;
use crate::script::ScriptDescriptor;

/// The document scripts are applied to
pub trait EditorHost {
    /// Text of every selection, in selection order
    fn selections(&self) -> Result<Vec<String>>;

    /// Details of the active document shown to scripts
    fn document_info(&self) -> EditorContext;

    /// Replace every selection in one edit. `replacements` has one entry per
    /// selection; either all are applied or none.
    fn replace_selections(&mut self, replacements: &[String]) -> Result<()>;

    /// Show `content` as a new, unsaved document
    fn open_untitled(&mut self, content: &str) -> Result<()>;
}

/// Lets the user choose which script to run
pub trait ScriptPicker {
    /// Index into `scripts`, or `None` when dismissed
    fn pick(&mut self, scripts: &[ScriptDescriptor]) -> Result<Option<usize>>;
}
