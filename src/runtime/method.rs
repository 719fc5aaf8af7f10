// src/runtime/method.rs
//! Method implementations and the invocation context handed to them

use crate::runtime::class::Class;
use crate::runtime::instance::Instance;
use crate::runtime::registry::ClassRegistry;
use crate::runtime::selector::Selector;
use crate::runtime::signature::Signature;
use crate::utils::errors::{InterceptionError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Executable code bound to a selector
pub type Imp = Arc<dyn Fn(&Invocation<'_>) -> Result<Value> + Send + Sync>;

static NEXT_IMP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one implementation, stable across swizzles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImpId(u64);

impl ImpId {
    fn next() -> Self {
        Self(NEXT_IMP_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A dispatch table entry: code plus its type encoding
#[derive(Clone)]
pub struct Method {
    id: ImpId,
    imp: Imp,
    signature: Signature,
    forwarder: bool,
}

impl Method {
    /// Wrap a closure as a method with the given signature
    pub fn new<F>(signature: Signature, imp: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_imp(signature, Arc::new(imp))
    }

    /// Class-local entry that super-sends `selector` at call time
    pub(crate) fn forwarder(selector: Selector, signature: Signature) -> Self {
        Self {
            id: ImpId::next(),
            imp: Arc::new(move |inv: &Invocation<'_>| inv.send_super(&selector, inv.args())),
            signature,
            forwarder: true,
        }
    }

    pub(crate) fn from_imp(signature: Signature, imp: Imp) -> Self {
        Self {
            id: ImpId::next(),
            imp,
            signature,
            forwarder: false,
        }
    }

    /// Identity of the implementation
    pub fn id(&self) -> ImpId {
        self.id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether this entry was synthesized to forward an inherited selector
    pub fn is_forwarder(&self) -> bool {
        self.forwarder
    }

    pub(crate) fn invoke(&self, invocation: &Invocation<'_>) -> Result<Value> {
        (self.imp)(invocation)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("id", &self.id)
            .field("signature", &self.signature.to_string())
            .field("forwarder", &self.forwarder)
            .finish()
    }
}

/// Everything an implementation can see about the call it is serving
pub struct Invocation<'a> {
    pub(crate) registry: &'a ClassRegistry,
    pub(crate) receiver: &'a Instance,
    pub(crate) selector: &'a Selector,
    pub(crate) args: &'a [Value],
    /// Class whose table held the implementation being run
    pub(crate) class: &'a Class,
}

impl<'a> Invocation<'a> {
    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    /// Object the message was sent to (`self`)
    pub fn receiver(&self) -> &'a Instance {
        self.receiver
    }

    /// Selector the call was dispatched under (`_cmd`)
    pub fn selector(&self) -> &'a Selector {
        self.selector
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn implementing_class(&self) -> &'a Class {
        self.class
    }

    /// Argument at `index`, or `ArgumentMismatch` if the call has fewer
    pub fn arg(&self, index: usize) -> Result<&'a Value> {
        self.args.get(index).ok_or_else(|| InterceptionError::ArgumentMismatch {
            selector: self.selector.to_string(),
            expected: format!("argument at position {}", index),
            found: format!("{} argument(s)", self.args.len()),
        })
    }

    /// Send a message to the receiver through normal dispatch
    pub fn send(&self, selector: &Selector, args: &[Value]) -> Result<Value> {
        self.registry.send(self.receiver, selector, args)
    }

    /// Send a message starting lookup at the implementing class's superclass
    pub fn send_super(&self, selector: &Selector, args: &[Value]) -> Result<Value> {
        self.registry.send_super(self.class, self.receiver, selector, args)
    }
}
