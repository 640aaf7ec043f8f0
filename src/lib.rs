//! Scriptify - apply your own JavaScript transforms to text selections
//!
//! Scripts are npm packages whose entry file exports a function
//! `(selectedText, selectionIndex, moduleConfig) => string | Promise<string>`.
//! They live in a `.scriptify` folder either inside the open project (local
//! scope) or in a configurable global folder (global scope), and are enabled
//! through that folder's `scriptify.json`.
//!
//! ## Layers
//!
//! - [`config`]: host settings and the per-scope `scriptify.json`
//! - [`script`]: manifests, discovery of enabled scripts, scaffolding, removal
//! - [`installer`]: registry search and package-manager installs
//! - [`sandbox`]: evaluation of script code in an isolated QuickJS context
//! - [`apply`]: the pick → run → commit pipeline against an editor host

pub mod apply;
pub mod config;
pub mod error;
pub mod installer;
pub mod output;
pub mod sandbox;
pub mod script;
pub mod storage;

pub use error::{Result, ScriptifyError};
