// src/runtime/class.rs
//! Classes and their dispatch tables
//!
//! Each class owns a table mapping selectors to methods. Lookup walks the
//! superclass chain one table at a time; the only operation that holds more
//! than one lock is [`Class::exchange_implementations`], which keeps the
//! class's write lock while reading ancestors. Locks are therefore always
//! taken subclass first, superclass second.

use crate::runtime::method::{Imp, ImpId, Invocation, Method};
use crate::runtime::selector::Selector;
use crate::runtime::signature::Signature;
use crate::utils::errors::{InterceptionError, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Outcome of [`Class::exchange_implementations`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Exchange {
    /// Selectors that needed a forwarder
    pub synthesized: Vec<Selector>,

    /// Implementation that sat behind the original selector, now behind the replacement
    pub original_imp: ImpId,

    /// Implementation that sat behind the replacement selector, now behind the original
    pub replacement_imp: ImpId,
}

/// A runtime class: name, optional superclass, dispatch table
pub struct Class {
    name: String,
    superclass: Option<Arc<Class>>,
    methods: RwLock<HashMap<Selector, Method>>,
}

impl Class {
    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclass, if any
    pub fn superclass(&self) -> Option<&Arc<Class>> {
        self.superclass.as_ref()
    }

    /// True if `name` is this class or one of its ancestors
    pub fn is_subclass_of(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.name == name {
                return true;
            }
            current = class.superclass.as_deref();
        }
        false
    }

    /// Entry stored directly on this class, ignoring ancestors
    pub fn own_method(&self, selector: &Selector) -> Option<Method> {
        self.methods.read().get(selector).cloned()
    }

    /// Check for an entry stored directly on this class
    pub fn has_own_method(&self, selector: &Selector) -> bool {
        self.methods.read().contains_key(selector)
    }

    /// Resolve a selector through the superclass chain
    ///
    /// Returns the method together with the class whose table held it.
    pub fn lookup(&self, selector: &Selector) -> Option<(Method, &Class)> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(method) = class.own_method(selector) {
                return Some((method, class));
            }
            current = class.superclass.as_deref();
        }
        None
    }

    /// Check whether the selector resolves anywhere in the chain
    pub fn responds_to(&self, selector: &Selector) -> bool {
        self.lookup(selector).is_some()
    }

    /// Selectors with an entry on this class, sorted
    pub fn selectors(&self) -> Vec<Selector> {
        let mut selectors: Vec<_> = self.methods.read().keys().cloned().collect();
        selectors.sort();
        selectors
    }

    /// Add a method only if the class has no entry of its own for `selector`
    pub fn add_method(&self, selector: Selector, method: Method) -> bool {
        let mut table = self.methods.write();
        if table.contains_key(&selector) {
            return false;
        }
        table.insert(selector, method);
        true
    }

    /// Install a method unconditionally, returning the previous own entry
    pub fn replace_method(&self, selector: Selector, method: Method) -> Option<Method> {
        self.methods.write().insert(selector, method)
    }

    /// Implementation ids for `selectors`, read under a single table lock
    ///
    /// Inherited entries are reported too. The snapshot is consistent with
    /// respect to exchanges on this class.
    pub fn implementation_ids(&self, selectors: &[Selector]) -> Vec<Option<ImpId>> {
        let table = self.methods.read();
        selectors
            .iter()
            .map(|selector| match table.get(selector) {
                Some(method) => Some(method.id()),
                None => self
                    .superclass
                    .as_ref()
                    .and_then(|superclass| superclass.lookup(selector))
                    .map(|(method, _)| method.id()),
            })
            .collect()
    }

    /// Swap the entries for two selectors in one write-locked step
    ///
    /// Selectors that are only inherited get a forwarding entry first so the
    /// swap stays local to this class. Nothing is written unless both
    /// selectors resolve.
    pub(crate) fn exchange_implementations(
        &self,
        original: &Selector,
        replacement: &Selector,
    ) -> Result<Exchange> {
        let mut table = self.methods.write();
        let mut synthesized = Vec::new();

        let first = self.resolve_for_exchange(&table, original, &mut synthesized)?;

        if original == replacement {
            let id = table.entry(original.clone()).or_insert(first).id();
            return Ok(Exchange {
                synthesized,
                original_imp: id,
                replacement_imp: id,
            });
        }

        let second = self.resolve_for_exchange(&table, replacement, &mut synthesized)?;
        let exchange = Exchange {
            synthesized,
            original_imp: first.id(),
            replacement_imp: second.id(),
        };

        table.insert(original.clone(), second);
        table.insert(replacement.clone(), first);

        Ok(exchange)
    }

    fn resolve_for_exchange(
        &self,
        table: &HashMap<Selector, Method>,
        selector: &Selector,
        synthesized: &mut Vec<Selector>,
    ) -> Result<Method> {
        if let Some(method) = table.get(selector) {
            return Ok(method.clone());
        }

        let inherited = self
            .superclass
            .as_ref()
            .and_then(|superclass| superclass.lookup(selector))
            .map(|(method, owner)| (method, owner.name.clone()));

        match inherited {
            Some((method, owner)) => {
                debug!(
                    "Synthesizing forwarder for {}.{} (inherited from {})",
                    self.name, selector, owner
                );
                synthesized.push(selector.clone());
                Ok(Method::forwarder(selector.clone(), method.signature().clone()))
            }
            None => Err(InterceptionError::SelectorNotFound {
                class: self.name.clone(),
                selector: selector.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| s.name.as_str()))
            .field("selectors", &self.selectors())
            .finish()
    }
}

/// Builder for a class definition
///
/// Signatures are given in the compact encoding of
/// [`Signature::parse`](crate::runtime::signature::Signature::parse) and are
/// validated when the class is defined.
///
/// ```
/// use serde_json::json;
/// use swizzle_engine::{ClassBuilder, ClassRegistry, Selector};
///
/// let registry = ClassRegistry::new();
/// registry
///     .define_class(
///         ClassBuilder::new("Greeter")
///             .method("sayHello", "*", |_| Ok(json!("hello"))),
///     )
///     .unwrap();
///
/// let greeter = registry.instantiate("Greeter").unwrap();
/// let reply = registry.send(&greeter, &Selector::new("sayHello"), &[]).unwrap();
/// assert_eq!(reply, json!("hello"));
/// ```
pub struct ClassBuilder {
    name: String,
    superclass: Option<String>,
    methods: Vec<(Selector, String, Imp)>,
}

impl ClassBuilder {
    /// Start a class definition with no superclass and no methods
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            methods: Vec::new(),
        }
    }

    /// Set the superclass by name
    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    /// Add a method with its signature encoding
    pub fn method<F>(mut self, selector: impl Into<Selector>, encoding: &str, imp: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods
            .push((selector.into(), encoding.to_string(), Arc::new(imp)));
        self
    }

    /// Name of the class being defined
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Superclass name, if one was set
    pub fn superclass_name(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub(crate) fn build(self, superclass: Option<Arc<Class>>) -> Result<Class> {
        let mut table = HashMap::with_capacity(self.methods.len());
        for (selector, encoding, imp) in self.methods {
            let signature = Signature::parse(&encoding)?;
            table.insert(selector, Method::from_imp(signature, imp));
        }

        Ok(Class {
            name: self.name,
            superclass,
            methods: RwLock::new(table),
        })
    }
}
