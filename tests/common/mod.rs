//! Shared test helpers for integration tests
#![allow(dead_code)]

use esm_hmr::hmr::{HotContext, ImportSpecifier, ModuleLoader, ModuleNamespace, ReloadReason};
use esm_hmr::{HmrConfig, ModuleId, ModuleRegistry, UpdateCoordinator};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Module code: runs against the context acquired for this execution
pub type ModuleBody = Rc<dyn Fn(&HotContext) -> ModuleNamespace>;

/// Reload reasons seen by the host, in order
pub type Reloads = Rc<RefCell<Vec<ReloadReason>>>;

/// Loader that "evaluates" registered module bodies against the registry
pub struct ScriptedLoader {
    registry: ModuleRegistry,
    modules: RefCell<HashMap<ModuleId, ModuleBody>>,
    failing: RefCell<HashSet<ModuleId>>,
    pub imports: RefCell<Vec<ImportSpecifier>>,
}

impl ScriptedLoader {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            modules: RefCell::new(HashMap::new()),
            failing: RefCell::new(HashSet::new()),
            imports: RefCell::new(Vec::new()),
        }
    }

    /// Register the code for a module
    pub fn define<F>(&self, url: &str, body: F)
    where
        F: Fn(&HotContext) -> ModuleNamespace + 'static,
    {
        let id = self.registry.resolve_id(url).unwrap();
        self.modules.borrow_mut().insert(id, Rc::new(body));
    }

    /// Initial page load of a module
    pub fn evaluate(&self, url: &str) -> HotContext {
        let id = self.registry.resolve_id(url).unwrap();
        self.run(&id)
    }

    /// Make future imports of a module fail
    pub fn fail(&self, url: &str) {
        let id = self.registry.resolve_id(url).unwrap();
        self.failing.borrow_mut().insert(id);
    }

    pub fn import_count(&self) -> usize {
        self.imports.borrow().len()
    }

    fn run(&self, id: &ModuleId) -> HotContext {
        let hot = self.registry.acquire(id.clone());
        let body = self.modules.borrow().get(id).cloned();
        if let Some(body) = body {
            body(&hot);
        }
        hot
    }
}

impl ModuleLoader for ScriptedLoader {
    async fn import(&self, specifier: &ImportSpecifier) -> anyhow::Result<ModuleNamespace> {
        self.imports.borrow_mut().push(specifier.clone());
        if self.failing.borrow().contains(&specifier.id) {
            anyhow::bail!("failed to fetch {}", specifier);
        }

        let hot = self.registry.acquire(specifier.id.clone());
        let body = self.modules.borrow().get(&specifier.id).cloned();
        Ok(match body {
            Some(body) => body(&hot),
            None => ModuleNamespace::new(),
        })
    }
}

/// Registry whose host records reload reasons
pub fn recording_registry() -> (ModuleRegistry, Reloads) {
    let reloads: Reloads = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&reloads);
    let registry = ModuleRegistry::new(Rc::new(move |reason: &ReloadReason| {
        log.borrow_mut().push(reason.clone())
    }));
    (registry, reloads)
}

/// Coordinator over a scripted loader with default config
pub fn harness() -> (UpdateCoordinator<ScriptedLoader>, Reloads) {
    let (registry, reloads) = recording_registry();
    let loader = ScriptedLoader::new(registry.clone());
    (UpdateCoordinator::new(registry, loader, HmrConfig::default()), reloads)
}

/// Shared event log
pub fn event_log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn update_message(url: &str) -> String {
    format!(r#"{{"type":"update","url":"{}"}}"#, url)
}
