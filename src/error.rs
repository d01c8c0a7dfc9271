//! Error types for the HMR client runtime

use crate::hmr::ModuleId;
use thiserror::Error;

/// Main error type for esm-hmr
///
/// A module that cannot be hot-swapped (unknown, not executable, declined) is
/// not an error: the update algorithm reports it as
/// [`UpdateStatus::NotApplied`](crate::hmr::UpdateStatus::NotApplied).
#[derive(Error, Debug)]
pub enum HmrError {
    /// Notification payload is not valid JSON or lacks a required field
    #[error("DecodeError: {0}")]
    Decode(#[from] serde_json::Error),

    /// An `update` notification without a usable `url`
    #[error("MalformedUpdate: {0}")]
    MalformedUpdate(String),

    /// Module URL could not be parsed
    #[error("InvalidUrl: {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The module loader failed to re-import a module
    #[error("ImportError: {id}: {source}")]
    Import {
        id: ModuleId,
        #[source]
        source: anyhow::Error,
    },

    /// A dispose callback failed
    #[error("DisposeError: {id}: {source}")]
    Dispose {
        id: ModuleId,
        #[source]
        source: anyhow::Error,
    },

    /// An accept callback failed
    #[error("AcceptError: {id}: {source}")]
    Accept {
        id: ModuleId,
        #[source]
        source: anyhow::Error,
    },

    /// Hot data could not be encoded or decoded
    #[error("SerializationError: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("ConfigError: {0}")]
    Config(String),

    /// IO error
    #[error("IOError: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HmrError {
    /// Module the error is attributed to, if any
    pub fn module_id(&self) -> Option<&ModuleId> {
        match self {
            Self::Import { id, .. } | Self::Dispose { id, .. } | Self::Accept { id, .. } => {
                Some(id)
            }
            _ => None,
        }
    }
}

/// Result type for esm-hmr operations
pub type Result<T> = std::result::Result<T, HmrError>;
