//! Configuration loading and management
//!
//! Two layers:
//! - [`Settings`]: host settings in `~/.scriptify/settings.toml`
//! - [`ClientConfig`]: the per-scope `scriptify.json` listing enabled scripts

mod client;
mod io;
mod scope;
mod settings;

pub use client::{CONFIG_FILE, ClientConfig, ClientConfigDocument, ModuleEntry, OutputLocation};
pub(crate) use client::to_pretty_json;
pub use scope::{ConfigScope, SCRIPTIFY_DIR, ScopeRoots};
pub use settings::Settings;
