//! Prelude module for convenient imports
//!
//! ```no_run
//! use esm_hmr::prelude::*;
//! ```

// Registry and module-facing API
pub use crate::hmr::{
    AcceptArgs, AcceptHandler, HotContext, HotData, ModuleId, ModuleRegistry,
};

// Collaborators
pub use crate::hmr::{ImportSpecifier, ModuleLoader, ModuleNamespace, ReloadHost, ReloadReason};

// Update algorithm
pub use crate::hmr::{apply_update, Rejection, UpdateResult, UpdateStatus};

// Coordinator and wire
pub use crate::coordinator::{Dispatch, RunSummary, UpdateCoordinator};
pub use crate::protocol::Notification;
pub use crate::transport::TransportEvent;

// Error handling and configuration
pub use crate::config::HmrConfig;
pub use crate::error::{HmrError, Result};

// Version constant
pub use crate::VERSION;
