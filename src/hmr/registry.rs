//! Registry of hot contexts, one record per module id

use super::context::ModuleRecord;
use super::{HotContext, ModuleId, ReloadHost};
use crate::config::HmrConfig;
use crate::error::Result;
use crate::protocol::{default_base_url, module_id_from_url};
use rustc_hash::FxHashMap as HashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use url::Url;

struct RegistryInner {
    modules: HashMap<ModuleId, Rc<RefCell<ModuleRecord>>>,
    host: Rc<dyn ReloadHost>,
    base_url: Url,
}

/// Module registry owned by one running application instance
///
/// Cloning yields another handle to the same registry. The coordinator holds
/// one handle, the module loader (and through it, evaluating module code)
/// holds another. Entries are never removed; a full reload discards the whole
/// registry.
#[derive(Clone)]
pub struct ModuleRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl ModuleRegistry {
    pub fn new(host: Rc<dyn ReloadHost>) -> Self {
        Self::with_base_url(host, default_base_url())
    }

    pub fn with_base_url(host: Rc<dyn ReloadHost>, base_url: Url) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                modules: HashMap::default(),
                host,
                base_url,
            })),
        }
    }

    pub fn with_config(host: Rc<dyn ReloadHost>, config: &HmrConfig) -> Result<Self> {
        Ok(Self::with_base_url(host, config.base_url()?))
    }

    /// Entry point for module code: `createHotContext(import.meta.url)`
    pub fn create_hot_context(&self, module_url: &str) -> Result<HotContext> {
        let id = self.resolve_id(module_url)?;
        Ok(self.acquire(id))
    }

    /// Get a context for a module that is about to (re-)register callbacks
    ///
    /// The first call for an id creates its record. Later calls lock every
    /// context handed out before and return a fresh, unlocked one.
    pub fn acquire(&self, id: ModuleId) -> HotContext {
        let mut inner = self.inner.borrow_mut();
        let RegistryInner { modules, host, .. } = &mut *inner;

        if let Some(record) = modules.get(&id) {
            let incarnation = {
                let mut record = record.borrow_mut();
                record.live += 1;
                record.live
            };
            tracing::debug!(
                module = %id,
                incarnation,
                "module re-executed, earlier contexts locked"
            );
            return HotContext::new(Rc::clone(record), incarnation, Rc::clone(host));
        }

        tracing::debug!(module = %id, "registered hot module");
        let record = Rc::new(RefCell::new(ModuleRecord::new(id.clone())));
        modules.insert(id, Rc::clone(&record));
        HotContext::new(record, 0, Rc::clone(host))
    }

    /// Context of the live incarnation, without locking anything
    pub fn lookup(&self, id: &ModuleId) -> Option<HotContext> {
        let inner = self.inner.borrow();
        inner.modules.get(id).map(|record| {
            let incarnation = record.borrow().live;
            HotContext::new(Rc::clone(record), incarnation, Rc::clone(&inner.host))
        })
    }

    /// Map a module URL to its registry id (the URL's path)
    pub fn resolve_id(&self, module_url: &str) -> Result<ModuleId> {
        module_id_from_url(module_url, &self.inner.borrow().base_url)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<_> = self.inner.borrow().modules.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.inner.borrow().modules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().modules.is_empty()
    }

    pub fn reload_host(&self) -> Rc<dyn ReloadHost> {
        Rc::clone(&self.inner.borrow().host)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ModuleRegistry")
            .field("modules", &format!("<{} modules>", inner.modules.len()))
            .field("base_url", &inner.base_url.as_str())
            .finish()
    }
}
