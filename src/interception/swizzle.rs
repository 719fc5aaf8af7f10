// src/interception/swizzle.rs
//! Method interception registry
//!
//! Swaps the implementations behind two selectors on one class so that every
//! call site addressing either selector runs the other's code. The swap is a
//! single write-locked step on the class's dispatch table; it is never rolled
//! back, and applying the same swap again reverses it.

use crate::observability::{SWIZZLE_APPLIED, SWIZZLE_FAILED, SWIZZLE_FORWARDERS};
use crate::runtime::method::ImpId;
use crate::runtime::registry::ClassRegistry;
use crate::runtime::selector::Selector;
use crate::utils::errors::{InterceptionError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// One applied swizzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwizzleRecord {
    /// Target class name
    pub class: String,

    /// Selector whose callers now run the replacement code
    pub original: Selector,

    /// Selector that now reaches the pre-swizzle code
    pub replacement: Selector,

    /// Selectors that were only inherited and got a class-local forwarder
    pub synthesized: Vec<Selector>,

    /// Implementation behind `original` before this swizzle
    pub original_imp: ImpId,

    /// Implementation behind `replacement` before this swizzle
    pub replacement_imp: ImpId,

    pub applied_at: DateTime<Utc>,
}

impl SwizzleRecord {
    /// Pre-swizzle implementations of `a` and `b` if this record swapped that pair
    fn prior_imps(&self, class: &str, a: &Selector, b: &Selector) -> Option<(ImpId, ImpId)> {
        if self.class != class {
            return None;
        }
        if &self.original == a && &self.replacement == b {
            Some((self.original_imp, self.replacement_imp))
        } else if &self.original == b && &self.replacement == a {
            Some((self.replacement_imp, self.original_imp))
        } else {
            None
        }
    }
}

/// Registry performing and remembering swizzles on a [`ClassRegistry`]
pub struct SwizzleRegistry {
    classes: Arc<ClassRegistry>,
    journal: Mutex<Vec<SwizzleRecord>>,
}

impl SwizzleRegistry {
    /// Create a registry operating on `classes`
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self {
            classes,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Class table the swizzles apply to
    pub fn class_registry(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    /// Exchange the implementations of `original` and `replacement` on `class_name`
    ///
    /// Afterwards, sending `original` runs the code that used to sit behind
    /// `replacement`, and sending `replacement` runs the former `original`
    /// code, so a replacement can reach the old behaviour by sending its own
    /// selector to the receiver.
    ///
    /// # Errors
    ///
    /// - `ClassNotFound` if `class_name` is not defined
    /// - `SelectorNotFound` if either selector is not reachable from the
    ///   class; the dispatch table is left untouched
    pub fn swizzle_method(
        &self,
        original: &Selector,
        replacement: &Selector,
        class_name: &str,
    ) -> Result<SwizzleRecord> {
        let class = match self.classes.class(class_name) {
            Ok(class) => class,
            Err(err) => {
                warn!("Swizzle {} <-> {} failed: {}", original, replacement, err);
                metrics::counter!(SWIZZLE_FAILED, "class" => class_name.to_string()).increment(1);
                return Err(err);
            }
        };

        let exchange = match class.exchange_implementations(original, replacement) {
            Ok(exchange) => exchange,
            Err(err) => {
                warn!("Swizzle {} <-> {} failed: {}", original, replacement, err);
                metrics::counter!(SWIZZLE_FAILED, "class" => class_name.to_string()).increment(1);
                return Err(err);
            }
        };

        if !exchange.synthesized.is_empty() {
            metrics::counter!(SWIZZLE_FORWARDERS, "class" => class_name.to_string())
                .increment(exchange.synthesized.len() as u64);
        }
        metrics::counter!(SWIZZLE_APPLIED, "class" => class_name.to_string()).increment(1);

        info!(
            "Swizzled {}: {} <-> {} ({} forwarder(s) synthesized)",
            class_name,
            original,
            replacement,
            exchange.synthesized.len()
        );

        let record = SwizzleRecord {
            class: class_name.to_string(),
            original: original.clone(),
            replacement: replacement.clone(),
            synthesized: exchange.synthesized,
            original_imp: exchange.original_imp,
            replacement_imp: exchange.replacement_imp,
            applied_at: Utc::now(),
        };
        self.journal.lock().push(record.clone());

        Ok(record)
    }

    /// Applied swizzles in order
    pub fn history(&self) -> Vec<SwizzleRecord> {
        self.journal.lock().clone()
    }

    /// Number of applied swizzles
    pub fn swizzle_count(&self) -> usize {
        self.journal.lock().len()
    }

    /// Whether `a` and `b` currently run each other's code on `class_name`
    ///
    /// The baseline is the pair's implementations just before the first
    /// swizzle that exchanged them. The live dispatch table is compared
    /// against it, so swizzles involving other selectors are accounted for.
    pub fn is_swapped(&self, class_name: &str, a: &Selector, b: &Selector) -> bool {
        if a == b {
            return false;
        }

        let baseline = self
            .journal
            .lock()
            .iter()
            .find_map(|record| record.prior_imps(class_name, a, b));
        let Some((prior_a, prior_b)) = baseline else {
            return false;
        };

        let Ok(class) = self.classes.class(class_name) else {
            return false;
        };
        let live = class.implementation_ids(&[a.clone(), b.clone()]);
        live[0] == Some(prior_b) && live[1] == Some(prior_a)
    }

    /// Serialize the journal as JSON
    pub fn export_history(&self) -> Result<String> {
        serde_json::to_string_pretty(&*self.journal.lock()).map_err(export_error)
    }
}

fn export_error(err: serde_json::Error) -> InterceptionError {
    InterceptionError::ObservabilityError(format!("Failed to serialize swizzle history: {}", err))
}
