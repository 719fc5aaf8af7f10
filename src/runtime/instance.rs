// src/runtime/instance.rs
//! Live objects

use crate::runtime::class::Class;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use ulid::Ulid;

/// An object of a registered class
///
/// Behaviour comes entirely from the class's dispatch table; the instance
/// itself only carries identity and a small ivar store that implementations
/// can use to keep per-object state (call counters in stubs, for example).
#[derive(Debug)]
pub struct Instance {
    id: Ulid,
    class: Arc<Class>,
    ivars: Mutex<HashMap<String, Value>>,
}

impl Instance {
    pub(crate) fn new(class: Arc<Class>) -> Self {
        Self {
            id: Ulid::new(),
            class,
            ivars: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn get_ivar(&self, name: &str) -> Option<Value> {
        self.ivars.lock().get(name).cloned()
    }

    /// Set an ivar, returning the previous value
    pub fn set_ivar(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.ivars.lock().insert(name.into(), value)
    }

    /// Increment an integer ivar, treating a missing one as zero
    pub fn bump_ivar(&self, name: &str) -> i64 {
        let mut ivars = self.ivars.lock();
        let next = ivars.get(name).and_then(Value::as_i64).unwrap_or(0) + 1;
        ivars.insert(name.to_string(), Value::from(next));
        next
    }
}
