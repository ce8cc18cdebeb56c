use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::server::Handler;

/// Method name to handler table.
///
/// Lookups are exact and case-sensitive. Registering a name twice replaces
/// the earlier handler: the last registration wins.
pub struct Registry<S = ()> {
    handlers: HashMap<String, Arc<dyn Handler<S>>>,
    order: Vec<String>,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Registry {
            handlers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register `handler` under `name`, shadowing any earlier registration.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler<S>>) {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            tracing::warn!(method = %name, "handler registered twice, later registration wins");
        } else {
            self.order.push(name.clone());
        }
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, method: &str) -> Option<&Arc<dyn Handler<S>>> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, in order of first registration.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("methods", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::FnHandler;
    use crate::types::DispatchFlags;
    use serde_json::{json, Value};

    fn constant(v: Value) -> Arc<dyn Handler> {
        FnHandler::new(move |_: &(), _, _| Ok(Some(v.clone())))
    }

    #[test]
    fn test_exact_match() {
        let mut reg = Registry::new();
        reg.register("hello", constant(json!(1)));
        assert!(reg.contains("hello"));
        assert!(!reg.contains("Hello"));
        assert!(!reg.contains("hell"));
        assert!(!reg.contains("hello "));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut reg = Registry::new();
        reg.register("dup", constant(json!("first")));
        reg.register("other", constant(json!(0)));
        reg.register("dup", constant(json!("second")));

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.methods().collect::<Vec<_>>(), vec!["dup", "other"]);

        let handler = reg.get("dup").unwrap();
        let out = handler.call(&(), DispatchFlags::empty(), Value::Null).unwrap();
        assert_eq!(out, Some(json!("second")));
    }

    #[test]
    fn test_empty() {
        let reg: Registry = Registry::default();
        assert!(reg.is_empty());
        assert!(reg.get("anything").is_none());
    }
}
