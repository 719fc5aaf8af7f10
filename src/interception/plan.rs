// src/interception/plan.rs
//! Instrumentation plans
//!
//! A plan is the list of swizzles a harness applies during setup, usually
//! loaded from configuration. Entries are applied in order. With `fail_fast`
//! (the default) the first failure aborts setup; swizzles applied before it
//! stay in place, since a swizzle is never rolled back.

use crate::interception::swizzle::{SwizzleRecord, SwizzleRegistry};
use crate::runtime::selector::Selector;
use crate::utils::errors::{InterceptionError, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// One requested swizzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwizzleSpec {
    pub class: String,
    pub original: Selector,
    pub replacement: Selector,
}

impl SwizzleSpec {
    pub fn new(
        class: impl Into<String>,
        original: impl Into<Selector>,
        replacement: impl Into<Selector>,
    ) -> Self {
        Self {
            class: class.into(),
            original: original.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered set of swizzles applied at setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationPlan {
    /// Stop at the first failing entry
    pub fail_fast: bool,

    pub swizzles: Vec<SwizzleSpec>,
}

impl Default for InstrumentationPlan {
    fn default() -> Self {
        Self {
            fail_fast: true,
            swizzles: Vec::new(),
        }
    }
}

/// Outcome of applying a plan
#[derive(Debug, Default)]
pub struct PlanReport {
    pub applied: Vec<SwizzleRecord>,
    pub failures: Vec<(SwizzleSpec, InterceptionError)>,
}

impl PlanReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl InstrumentationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn swizzle(mut self, spec: SwizzleSpec) -> Self {
        self.swizzles.push(spec);
        self
    }

    pub fn len(&self) -> usize {
        self.swizzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swizzles.is_empty()
    }

    /// Apply every entry against `registry`
    pub fn apply(&self, registry: &SwizzleRegistry) -> Result<PlanReport> {
        info!(
            "Applying instrumentation plan ({} swizzles, fail_fast: {})",
            self.swizzles.len(),
            self.fail_fast
        );

        let mut report = PlanReport::default();

        for spec in &self.swizzles {
            match registry.swizzle_method(&spec.original, &spec.replacement, &spec.class) {
                Ok(record) => report.applied.push(record),
                Err(err) if self.fail_fast => {
                    error!(
                        "Aborting instrumentation at {}.{}: {}",
                        spec.class, spec.original, err
                    );
                    return Err(err);
                }
                Err(err) => {
                    warn!("Skipping {}.{}: {}", spec.class, spec.original, err);
                    report.failures.push((spec.clone(), err));
                }
            }
        }

        info!(
            "Instrumentation plan done: {} applied, {} failed",
            report.applied.len(),
            report.failures.len()
        );

        Ok(report)
    }
}
