//! Update coordinator
//!
//! Consumes notification stream events one at a time, decodes them and either
//! hot-swaps the addressed module or falls back to a full reload. Every
//! failure inside the update path degrades to a reload, including an `update`
//! without a usable `url`. Other malformed payloads are logged and dropped
//! without disturbing the running application.

use crate::config::HmrConfig;
use crate::error::HmrError;
use crate::hmr::{
    apply_update, ModuleLoader, ModuleRegistry, ReloadHost, ReloadReason, UpdateResult,
    UpdateStatus,
};
use crate::protocol::Notification;
use crate::transport::TransportEvent;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What the coordinator did with one event
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// A full reload was triggered
    Reloaded(ReloadReason),
    /// The module was hot-swapped
    Applied(UpdateResult),
    /// Nothing to do
    Ignored,
}

impl Dispatch {
    pub fn is_reload(&self) -> bool {
        matches!(self, Self::Reloaded(_))
    }
}

/// Counts of dispatch decisions over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    pub applied: usize,
    pub reloads: usize,
    pub ignored: usize,
}

impl RunSummary {
    pub fn record(&mut self, dispatch: &Dispatch) {
        self.events += 1;
        match dispatch {
            Dispatch::Reloaded(_) => self.reloads += 1,
            Dispatch::Applied(_) => self.applied += 1,
            Dispatch::Ignored => self.ignored += 1,
        }
    }
}

/// Drives the update algorithm from notification stream events
pub struct UpdateCoordinator<L> {
    registry: ModuleRegistry,
    loader: L,
    config: HmrConfig,
    host: Rc<dyn ReloadHost>,
    /// Set by a connection error, cleared by the next open
    disconnected: bool,
    last_token: u64,
}

impl<L: ModuleLoader> UpdateCoordinator<L> {
    /// Reloads go to the registry's host, the same one `invalidate()` uses
    pub fn new(registry: ModuleRegistry, loader: L, config: HmrConfig) -> Self {
        let host = registry.reload_host();
        Self {
            registry,
            loader,
            config,
            host,
            disconnected: false,
            last_token: 0,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn config(&self) -> &HmrConfig {
        &self.config
    }

    /// Process events until the channel closes
    ///
    /// Each event, including any re-import it awaits, completes before the
    /// next one is received.
    pub async fn run(&mut self, mut events: mpsc::Receiver<TransportEvent>) -> RunSummary {
        debug!("listening for file changes...");
        let mut summary = RunSummary::default();
        while let Some(event) = events.recv().await {
            let dispatch = self.handle_event(event).await;
            summary.record(&dispatch);
        }
        debug!(?summary, "notification stream closed");
        summary
    }

    pub async fn handle_event(&mut self, event: TransportEvent) -> Dispatch {
        match event {
            TransportEvent::Open => {
                if std::mem::take(&mut self.disconnected) && self.config.reload_on_reconnect {
                    return self.reload(ReloadReason::Reconnected);
                }
                Dispatch::Ignored
            }
            TransportEvent::Error => {
                warn!("notification stream error, waiting for reconnect");
                self.disconnected = true;
                Dispatch::Ignored
            }
            TransportEvent::Message(payload) => self.handle_message(&payload).await,
        }
    }

    pub async fn handle_message(&mut self, payload: &str) -> Dispatch {
        let notification = match Notification::decode(payload) {
            Ok(notification) => notification,
            Err(err @ HmrError::MalformedUpdate(_)) => return self.fail(err),
            Err(err) => {
                warn!(error = %err, payload, "ignoring malformed message");
                return Dispatch::Ignored;
            }
        };

        match notification {
            Notification::Reload => {
                debug!("message: reload");
                self.reload(ReloadReason::Requested)
            }
            Notification::Update { url } => {
                debug!(%url, "message: update");
                self.handle_update(&url).await
            }
            Notification::Unknown => {
                debug!(payload, "message: unknown");
                Dispatch::Ignored
            }
        }
    }

    async fn handle_update(&mut self, url: &str) -> Dispatch {
        let id = match self.registry.resolve_id(url) {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        debug!(module = %id, registered = ?self.registry.ids(), "applying update");

        let token = self.next_token();
        match apply_update(&self.registry, &self.loader, &self.config, &id, token).await {
            Ok(result) => match result.status {
                UpdateStatus::Applied => {
                    info!(
                        module = %id,
                        disposed = result.disposed,
                        accepted = result.accepted,
                        reimported = result.reimported,
                        elapsed = ?result.duration,
                        "hot update applied"
                    );
                    Dispatch::Applied(result)
                }
                UpdateStatus::NotApplied(rejection) => {
                    warn!(module = %id, %rejection, "hot update not applied");
                    self.reload(ReloadReason::Rejected { id, rejection })
                }
            },
            Err(err) => self.fail(err),
        }
    }

    fn fail(&self, err: HmrError) -> Dispatch {
        error!(error = %err, "hot update failed");
        self.reload(ReloadReason::Failed {
            message: err.to_string(),
        })
    }

    fn reload(&self, reason: ReloadReason) -> Dispatch {
        info!(%reason, "full reload");
        self.host.reload(&reason);
        Dispatch::Reloaded(reason)
    }

    /// Millisecond timestamp, bumped when needed so tokens never repeat
    fn next_token(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.last_token = now.max(self.last_token + 1);
        self.last_token
    }
}
