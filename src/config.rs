//! Runtime configuration

use crate::error::{HmrError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default base for resolving relative module URLs
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// HMR client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmrConfig {
    /// Suffixes of module ids that can be hot-swapped
    pub executable_extensions: Vec<String>,
    /// Query parameter carrying the cache-busting token on re-import
    pub cache_bust_param: String,
    /// Base against which relative module URLs are resolved
    pub base_url: String,
    /// Treat a reconnect after a connection error as a reload request
    pub reload_on_reconnect: bool,
    /// Abort the update when a dispose callback fails
    pub dispose_errors_fatal: bool,
}

impl Default for HmrConfig {
    fn default() -> Self {
        Self {
            executable_extensions: vec![".js".to_string()],
            cache_bust_param: "mtime".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            reload_on_reconnect: true,
            dispose_errors_fatal: true,
        }
    }
}

impl HmrConfig {
    /// Load and validate a JSON config file; missing fields take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| HmrError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.executable_extensions.is_empty() {
            return Err(HmrError::Config("executable_extensions must not be empty".to_string()));
        }
        if let Some(ext) = self.executable_extensions.iter().find(|ext| !ext.starts_with('.')) {
            return Err(HmrError::Config(format!("extension {:?} must start with '.'", ext)));
        }
        if self.cache_bust_param.is_empty() {
            return Err(HmrError::Config("cache_bust_param must not be empty".to_string()));
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|source| HmrError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })
    }
}
