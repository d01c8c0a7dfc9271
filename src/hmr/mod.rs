//! Hot Module Replacement
//!
//! Module-state tracking and update application for ES modules running in a
//! browser-like host. Each module that opts into hot replacement obtains a
//! [`HotContext`] from the [`ModuleRegistry`] while it evaluates and uses it to
//! register accept and dispose callbacks, or to decline fine-grained updates.
//!
//! When an update for a module arrives, [`apply_update`] drains the callbacks
//! registered by the live version, runs the dispose callbacks, re-imports the
//! module through the [`ModuleLoader`] (only if something accepted) and hands
//! the new namespace to the accept callbacks.
//!
//! # Example
//! ```text
//! // In counter.js
//! import.meta.hot.dispose(({ data }) => {
//!   data.count = count;
//! });
//! import.meta.hot.accept(({ module, data }) => {
//!   module.restore(data.count);
//! });
//! ```

mod context;
mod data;
mod host;
mod loader;
mod registry;
mod update;

pub use context::{AcceptArgs, AcceptCallback, AcceptHandler, DisposeCallback, HotContext};
pub use data::HotData;
pub use host::{ReloadHost, ReloadReason};
pub use loader::{ImportSpecifier, ModuleLoader, ModuleNamespace};
pub use registry::ModuleRegistry;
pub use update::{apply_update, Rejection, UpdateResult, UpdateStatus};

use serde::{Deserialize, Serialize};

/// Module identifier: the path component of the module's URL
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id ends with one of the given extensions
    pub fn has_extension<S: AsRef<str>>(&self, extensions: &[S]) -> bool {
        extensions.iter().any(|ext| self.0.ends_with(ext.as_ref()))
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
