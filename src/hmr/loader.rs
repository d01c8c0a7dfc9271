//! Module loader collaborator
//!
//! The loader resolves a module specifier to executable code, evaluates it and
//! returns its exported namespace. Evaluating the module is what re-registers
//! its hot callbacks: module code calls
//! [`ModuleRegistry::create_hot_context`](super::ModuleRegistry::create_hot_context)
//! again while it runs.

use super::ModuleId;
use serde_json::{Map, Value};
use std::fmt;

/// Cache-busting re-import request for a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub id: ModuleId,
    /// Query parameter carrying the token
    pub param: String,
    /// Strictly increasing per coordinator
    pub token: u64,
}

impl ImportSpecifier {
    pub fn new(id: ModuleId, param: impl Into<String>, token: u64) -> Self {
        Self {
            id,
            param: param.into(),
            token,
        }
    }

    /// Specifier passed to the loader, e.g. `/a.js?mtime=1700000000000`
    pub fn url(&self) -> String {
        format!("{}?{}={}", self.id, self.param, self.token)
    }
}

impl fmt::Display for ImportSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Exported namespace of an evaluated module
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleNamespace {
    exports: Map<String, Value>,
}

impl ModuleNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named export
    pub fn with_export(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.exports.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }

    pub fn exports(&self) -> &Map<String, Value> {
        &self.exports
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl From<Map<String, Value>> for ModuleNamespace {
    fn from(exports: Map<String, Value>) -> Self {
        Self { exports }
    }
}

/// Performs the dynamic re-import of a module
///
/// Futures returned here run on the coordinator's single-threaded loop and
/// need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait ModuleLoader {
    async fn import(&self, specifier: &ImportSpecifier) -> anyhow::Result<ModuleNamespace>;
}
