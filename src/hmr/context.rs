//! Per-module hot context

use super::{HotData, ModuleId, ModuleNamespace, ReloadHost, ReloadReason};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Arguments handed to an accept callback
pub struct AcceptArgs<'a> {
    /// Namespace of the freshly re-imported module
    pub module: &'a ModuleNamespace,
    /// Data written by this cycle's dispose callbacks
    pub data: &'a mut HotData,
}

pub type AcceptCallback = Box<dyn FnMut(AcceptArgs<'_>) -> anyhow::Result<()>>;
pub type DisposeCallback = Box<dyn FnMut(&mut HotData) -> anyhow::Result<()>>;

/// A registered reaction to a module update
#[derive(Default)]
pub enum AcceptHandler {
    /// Re-importing the module is the whole effect
    #[default]
    SideEffectOnly,
    Callback(AcceptCallback),
}

impl AcceptHandler {
    pub fn callback<F>(f: F) -> Self
    where
        F: FnMut(AcceptArgs<'_>) -> anyhow::Result<()> + 'static,
    {
        Self::Callback(Box::new(f))
    }
}

impl fmt::Debug for AcceptHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SideEffectOnly => f.write_str("SideEffectOnly"),
            Self::Callback(_) => f.write_str("Callback(<fn>)"),
        }
    }
}

/// Registry-owned state of one module, shared by all of its incarnations
pub(crate) struct ModuleRecord {
    pub(crate) id: ModuleId,
    /// Incarnation whose `accept` calls are honored
    pub(crate) live: u64,
    pub(crate) declined: bool,
    pub(crate) accept_callbacks: Vec<AcceptHandler>,
    pub(crate) dispose_callbacks: Vec<DisposeCallback>,
}

impl ModuleRecord {
    pub(crate) fn new(id: ModuleId) -> Self {
        Self {
            id,
            live: 0,
            declined: false,
            accept_callbacks: Vec::new(),
            dispose_callbacks: Vec::new(),
        }
    }
}

/// Hot context handed to one execution of a module (`import.meta.hot`)
///
/// Every time a module evaluates it acquires a new context for the same id.
/// Contexts of earlier executions become locked: they can no longer register
/// accept callbacks, but can still register dispose callbacks so the
/// superseded code gets to clean up after itself.
#[derive(Clone)]
pub struct HotContext {
    record: Rc<RefCell<ModuleRecord>>,
    incarnation: u64,
    host: Rc<dyn ReloadHost>,
}

impl HotContext {
    pub(crate) fn new(
        record: Rc<RefCell<ModuleRecord>>,
        incarnation: u64,
        host: Rc<dyn ReloadHost>,
    ) -> Self {
        Self {
            record,
            incarnation,
            host,
        }
    }

    pub fn id(&self) -> ModuleId {
        self.record.borrow().id.clone()
    }

    /// Whether a newer execution of this module has taken over
    pub fn is_locked(&self) -> bool {
        self.record.borrow().live != self.incarnation
    }

    pub fn is_declined(&self) -> bool {
        self.record.borrow().declined
    }

    /// Accept updates with no explicit reaction; re-importing is enough
    pub fn accept(&self) {
        self.accept_handler(AcceptHandler::SideEffectOnly);
    }

    /// Accept updates and react to the new module namespace
    pub fn accept_with<F>(&self, callback: F)
    where
        F: FnMut(AcceptArgs<'_>) -> anyhow::Result<()> + 'static,
    {
        self.accept_handler(AcceptHandler::callback(callback));
    }

    /// Register an accept handler; a no-op once this context is locked
    pub fn accept_handler(&self, handler: AcceptHandler) {
        let mut record = self.record.borrow_mut();
        if record.live != self.incarnation {
            tracing::trace!(module = %record.id, "ignoring accept on locked context");
            return;
        }
        record.accept_callbacks.push(handler);
    }

    /// Register teardown to run before this module is replaced
    pub fn dispose<F>(&self, callback: F)
    where
        F: FnMut(&mut HotData) -> anyhow::Result<()> + 'static,
    {
        self.record.borrow_mut().dispose_callbacks.push(Box::new(callback));
    }

    /// Refuse fine-grained updates for this module permanently
    pub fn decline(&self) {
        let mut record = self.record.borrow_mut();
        tracing::debug!(module = %record.id, "module declined hot updates");
        record.declined = true;
    }

    /// Force a full reload right away
    pub fn invalidate(&self) {
        let id = self.id();
        tracing::debug!(module = %id, "module invalidated");
        self.host.reload(&ReloadReason::Invalidated(id));
    }

    pub fn accept_count(&self) -> usize {
        self.record.borrow().accept_callbacks.len()
    }

    pub fn dispose_count(&self) -> usize {
        self.record.borrow().dispose_callbacks.len()
    }

    /// Drain both callback lists, leaving them empty on the record
    pub(crate) fn take_callbacks(&self) -> (Vec<AcceptHandler>, Vec<DisposeCallback>) {
        let mut record = self.record.borrow_mut();
        (
            std::mem::take(&mut record.accept_callbacks),
            std::mem::take(&mut record.dispose_callbacks),
        )
    }
}

impl fmt::Debug for HotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record.borrow();
        f.debug_struct("HotContext")
            .field("id", &record.id)
            .field("incarnation", &self.incarnation)
            .field("is_locked", &(record.live != self.incarnation))
            .field("is_declined", &record.declined)
            .field("accept_callbacks", &record.accept_callbacks.len())
            .field("dispose_callbacks", &record.dispose_callbacks.len())
            .finish()
    }
}
