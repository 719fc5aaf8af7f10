// src/runtime/registry.rs
//! Process-wide class table and message dispatch
//!
//! The registry is created once during harness setup and passed by reference
//! to everything that defines classes, sends messages or swizzles. All call
//! sites go through [`ClassRegistry::send`], which is what makes a swizzle
//! visible everywhere at once.

use crate::runtime::class::{Class, ClassBuilder};
use crate::runtime::instance::Instance;
use crate::runtime::method::Invocation;
use crate::runtime::selector::Selector;
use crate::utils::errors::{InterceptionError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, trace};

/// Registry of live classes
pub struct ClassRegistry {
    classes: DashMap<String, Arc<Class>>,
}

impl ClassRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
        }
    }

    /// Define a new class
    ///
    /// The superclass, if named, must already be defined.
    pub fn define_class(&self, builder: ClassBuilder) -> Result<Arc<Class>> {
        let superclass = builder
            .superclass_name()
            .map(|name| self.class(name))
            .transpose()?;

        let class = Arc::new(builder.build(superclass)?);

        match self.classes.entry(class.name().to_string()) {
            Entry::Occupied(_) => Err(InterceptionError::DuplicateClass(class.name().to_string())),
            Entry::Vacant(slot) => {
                info!(
                    "Defined class {} ({} methods, superclass: {})",
                    class.name(),
                    class.selectors().len(),
                    class.superclass().map(|s| s.name()).unwrap_or("-")
                );
                slot.insert(Arc::clone(&class));
                Ok(class)
            }
        }
    }

    /// Resolve a class by name
    pub fn class(&self, name: &str) -> Result<Arc<Class>> {
        self.classes
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| InterceptionError::ClassNotFound(name.to_string()))
    }

    /// Check whether a class is defined
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Names of all defined classes, sorted
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.classes.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of defined classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check whether no class is defined
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Create an instance of a class
    pub fn instantiate(&self, class_name: &str) -> Result<Instance> {
        Ok(Instance::new(self.class(class_name)?))
    }

    /// Whether instances of `class_name` respond to `selector`
    pub fn responds_to(&self, class_name: &str, selector: &Selector) -> Result<bool> {
        Ok(self.class(class_name)?.responds_to(selector))
    }

    /// Send a message to `receiver`
    pub fn send(&self, receiver: &Instance, selector: &Selector, args: &[Value]) -> Result<Value> {
        self.dispatch(receiver.class(), receiver, selector, args)
    }

    /// Send a message, starting lookup at the superclass of `class`
    pub fn send_super(
        &self,
        class: &Class,
        receiver: &Instance,
        selector: &Selector,
        args: &[Value],
    ) -> Result<Value> {
        match class.superclass() {
            Some(superclass) => self.dispatch(superclass, receiver, selector, args),
            None => Err(InterceptionError::UnrecognizedSelector {
                class: receiver.class_name().to_string(),
                selector: selector.to_string(),
            }),
        }
    }

    fn dispatch(
        &self,
        start: &Class,
        receiver: &Instance,
        selector: &Selector,
        args: &[Value],
    ) -> Result<Value> {
        let (method, owner) =
            start
                .lookup(selector)
                .ok_or_else(|| InterceptionError::UnrecognizedSelector {
                    class: receiver.class_name().to_string(),
                    selector: selector.to_string(),
                })?;

        // Forwarders are checked by the inherited method they reach
        if !method.is_forwarder() {
            method.signature().check_args(selector, args)?;
        }

        trace!(
            "Dispatch {}.{} -> {:?} on {}",
            receiver.class_name(),
            selector,
            method.id(),
            owner.name()
        );

        let result = method.invoke(&Invocation {
            registry: self,
            receiver,
            selector,
            args,
            class: owner,
        })?;

        if !method.is_forwarder() {
            method.signature().check_return(selector, &result)?;
        }
        Ok(result)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
