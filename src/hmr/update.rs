//! Update application algorithm

use super::{
    AcceptArgs, AcceptHandler, HotData, ImportSpecifier, ModuleId, ModuleLoader, ModuleRegistry,
};
use crate::config::HmrConfig;
use crate::error::{HmrError, Result};
use std::fmt;
use std::time::{Duration, Instant};

/// Why a module could not be hot-swapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No context was ever created for the id
    UnknownModule,
    /// The id does not denote an executable module resource
    NotExecutable,
    /// The module called `decline()`
    Declined,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownModule => write!(f, "module is not registered"),
            Self::NotExecutable => write!(f, "not an executable module"),
            Self::Declined => write!(f, "module declined hot updates"),
        }
    }
}

/// Outcome of an update that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Applied,
    NotApplied(Rejection),
}

/// Result of applying an update
#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub module_id: ModuleId,
    pub status: UpdateStatus,
    /// Dispose callbacks invoked
    pub disposed: usize,
    /// Accept handlers invoked, side-effect-only ones included
    pub accepted: usize,
    /// Whether the module was re-imported
    pub reimported: bool,
    pub duration: Duration,
}

impl UpdateResult {
    fn rejected(module_id: &ModuleId, rejection: Rejection, start: Instant) -> Self {
        Self {
            module_id: module_id.clone(),
            status: UpdateStatus::NotApplied(rejection),
            disposed: 0,
            accepted: 0,
            reimported: false,
            duration: start.elapsed(),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == UpdateStatus::Applied
    }
}

/// Apply an update to a single module
///
/// Callbacks registered by the live version are drained before anything runs,
/// so registrations made while the module re-executes land on an empty list
/// and a failed cycle never invokes stale callbacks twice. Dispose callbacks
/// all run before the re-import; accept handlers run after it, in
/// registration order, sharing one fresh [`HotData`] with the dispose phase.
///
/// When nothing accepted the update the module is not re-imported and the
/// update still counts as applied.
pub async fn apply_update<L: ModuleLoader>(
    registry: &ModuleRegistry,
    loader: &L,
    config: &HmrConfig,
    id: &ModuleId,
    token: u64,
) -> Result<UpdateResult> {
    let start = Instant::now();

    let Some(context) = registry.lookup(id) else {
        return Ok(UpdateResult::rejected(id, Rejection::UnknownModule, start));
    };
    if !id.has_extension(config.executable_extensions.as_slice()) {
        return Ok(UpdateResult::rejected(id, Rejection::NotExecutable, start));
    }
    if context.is_declined() {
        return Ok(UpdateResult::rejected(id, Rejection::Declined, start));
    }

    let mut data = HotData::new();
    let (accept_callbacks, dispose_callbacks) = context.take_callbacks();
    let disposed = dispose_callbacks.len();

    for mut dispose in dispose_callbacks {
        if let Err(source) = dispose(&mut data) {
            if config.dispose_errors_fatal {
                return Err(HmrError::Dispose { id: id.clone(), source });
            }
            tracing::warn!(module = %id, error = %source, "dispose callback failed");
        }
    }

    if accept_callbacks.is_empty() {
        tracing::debug!(module = %id, disposed, "no accept callbacks, skipping re-import");
        return Ok(UpdateResult {
            module_id: id.clone(),
            status: UpdateStatus::Applied,
            disposed,
            accepted: 0,
            reimported: false,
            duration: start.elapsed(),
        });
    }

    let specifier = ImportSpecifier::new(id.clone(), config.cache_bust_param.clone(), token);
    tracing::debug!(module = %id, specifier = %specifier, "re-importing module");
    let module = loader
        .import(&specifier)
        .await
        .map_err(|source| HmrError::Import { id: id.clone(), source })?;

    let mut accepted = 0;
    for handler in accept_callbacks {
        match handler {
            AcceptHandler::SideEffectOnly => {}
            AcceptHandler::Callback(mut accept) => {
                accept(AcceptArgs {
                    module: &module,
                    data: &mut data,
                })
                .map_err(|source| HmrError::Accept { id: id.clone(), source })?;
            }
        }
        accepted += 1;
    }

    Ok(UpdateResult {
        module_id: id.clone(),
        status: UpdateStatus::Applied,
        disposed,
        accepted,
        reimported: true,
        duration: start.elapsed(),
    })
}
