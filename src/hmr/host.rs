//! Full-reload collaborator

use super::{ModuleId, Rejection};
use std::fmt;

/// Why a full reload was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadReason {
    /// The server sent a `reload` notification
    Requested,
    /// The target module could not be hot-swapped
    Rejected { id: ModuleId, rejection: Rejection },
    /// Resolving or applying an update failed
    Failed { message: String },
    /// The notification stream reconnected after an error
    Reconnected,
    /// Module code called `invalidate()`
    Invalidated(ModuleId),
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "reload requested"),
            Self::Rejected { id, rejection } => {
                write!(f, "update rejected for {}: {}", id, rejection)
            }
            Self::Failed { message } => write!(f, "update failed: {}", message),
            Self::Reconnected => write!(f, "reconnected after connection error"),
            Self::Invalidated(id) => write!(f, "invalidated by {}", id),
        }
    }
}

/// Restarts the application from scratch
///
/// In a browser this is `location.reload()`. The whole runtime, registry
/// included, is expected to be discarded by the host.
pub trait ReloadHost {
    fn reload(&self, reason: &ReloadReason);
}

impl<F> ReloadHost for F
where
    F: Fn(&ReloadReason),
{
    fn reload(&self, reason: &ReloadReason) {
        self(reason)
    }
}
