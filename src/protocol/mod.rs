//! Notification protocol
//!
//! Every message on the notification stream is a JSON object with a `type`
//! field:
//!
//! - `{"type": "reload"}`: full reload, unconditionally
//! - `{"type": "update", "url": "/src/app.js"}`: hot-swap the module whose id
//!   is the URL's path
//!
//! Other `type` values decode to [`Notification::Unknown`] and are ignored.
//! An `update` whose `url` is missing or not a string is reported as
//! [`HmrError::MalformedUpdate`] so callers can tell it apart from noise.

use crate::config::DEFAULT_BASE_URL;
use crate::error::{HmrError, Result};
use crate::hmr::ModuleId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// A decoded notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    /// Full page reload
    Reload,
    /// A module changed on disk
    Update {
        /// Module-identifying URL
        url: String,
    },
    /// Any other message type
    #[serde(other)]
    Unknown,
}

impl Notification {
    pub fn decode(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)?;
        let is_update = value.get("type").and_then(Value::as_str) == Some("update");
        serde_json::from_value(value).map_err(|err| {
            if is_update {
                HmrError::MalformedUpdate(err.to_string())
            } else {
                HmrError::Decode(err)
            }
        })
    }

    pub fn update(url: impl Into<String>) -> Self {
        Self::Update { url: url.into() }
    }
}

/// Module id for a URL: its path, with query and fragment dropped
///
/// Relative URLs are resolved against `base`.
pub fn module_id_from_url(url: &str, base: &Url) -> Result<ModuleId> {
    let resolved = base.join(url).map_err(|source| HmrError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    Ok(ModuleId::new(resolved.path()))
}

pub(crate) fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}
