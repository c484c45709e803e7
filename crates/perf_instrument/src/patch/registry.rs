use crate::host::{AppRegistryHost, AppRunnable, RegisterFn, RunFn};
use perf_context::{ContextId, Profiler};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Label application runs are charged under.
pub const RUN_LABEL: &str = "runApplication";

/// Context active when each application key was registered.
///
/// Registration and run are correlated only by key and may be arbitrarily
/// far apart, so the context travels through this table.
#[derive(Debug, Default)]
pub struct AppContextTable {
    contexts: RefCell<HashMap<String, Option<ContextId>>>,
}

impl AppContextTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `context` for `app_key`, replacing any earlier entry.
    pub fn insert(&self, app_key: &str, context: Option<ContextId>) {
        self.contexts
            .borrow_mut()
            .insert(app_key.to_string(), context);
    }

    /// Context captured for `app_key`, if it was registered in one.
    pub fn lookup(&self, app_key: &str) -> Option<ContextId> {
        self.contexts.borrow().get(app_key).cloned().flatten()
    }

    /// Whether `app_key` has been registered.
    pub fn contains(&self, app_key: &str) -> bool {
        self.contexts.borrow().contains_key(app_key)
    }

    /// Forget `app_key`, returning its captured context.
    pub fn remove(&self, app_key: &str) -> Option<ContextId> {
        self.contexts.borrow_mut().remove(app_key).flatten()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.contexts.borrow().len()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.contexts.borrow().is_empty()
    }
}

/// Record the registering context for every application key and run each
/// application inside it.
pub(crate) fn patch_app_registry(
    profiler: &Profiler,
    table: &Rc<AppContextTable>,
    host: &dyn AppRegistryHost,
) {
    for entry in [host.register_component(), host.register_runnable()] {
        let profiler = profiler.clone();
        let table = Rc::clone(table);
        entry.intercept(move |original| {
            let patched: Rc<RegisterFn> = Rc::new(move |app_key: &str, runnable: AppRunnable| {
                table.insert(app_key, profiler.current_context());
                original(app_key, runnable)
            });
            patched
        });
    }

    let profiler = profiler.clone();
    let table = Rc::clone(table);
    host.run_application().intercept(move |original| {
        let patched: Rc<RunFn> = Rc::new(move |app_key: &str, params: &Value| {
            let context = table.lookup(app_key);
            profiler.execute_in_optional_context(context.as_ref(), RUN_LABEL, || {
                original(app_key, params)
            })
        });
        patched
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_insert_lookup_remove() {
        let table = AppContextTable::new();
        assert!(table.is_empty());

        table.insert("Main", Some(ContextId::new("Boot")));
        table.insert("Widget", None);

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Main").unwrap(), "Boot");
        assert!(table.lookup("Widget").is_none());
        assert!(table.contains("Widget"));
        assert!(table.lookup("Missing").is_none());

        assert_eq!(table.remove("Main").unwrap(), "Boot");
        assert!(!table.contains("Main"));
    }

    #[test]
    fn test_table_reregistration_replaces_context() {
        let table = AppContextTable::new();
        table.insert("Main", Some(ContextId::new("First")));
        table.insert("Main", Some(ContextId::new("Second")));
        assert_eq!(table.lookup("Main").unwrap(), "Second");
        assert_eq!(table.len(), 1);
    }
}
