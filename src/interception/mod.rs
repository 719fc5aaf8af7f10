// src/interception/mod.rs
//! Method interception layer
//!
//! This module provides transparent substitution of method implementations
//! on live classes:
//!
//! - **Swizzle Registry**: Atomic exchange of two selectors' implementations
//! - **Instrumentation Plan**: Ordered swizzles applied at harness setup
//!
//! # Architecture
//!
//! ```text
//! Harness setup
//!     │
//!     └─ InstrumentationPlan::apply
//!            │
//!            └─ SwizzleRegistry::swizzle_method(original, replacement, class)
//!                   │
//!                   └─ Class::exchange_implementations (one write lock)
//!
//! Call sites (unmodified) ── send(original) ──► replacement code
//!                                                  └─ send(replacement) ──► original code
//! ```

pub mod plan;
pub mod swizzle;

// Re-export commonly used types
pub use plan::{InstrumentationPlan, PlanReport, SwizzleSpec};
pub use swizzle::{SwizzleRecord, SwizzleRegistry};
