// src/lib.rs
//! Swizzle Engine Library
//!
//! Runtime method interception for UI test-automation harnesses: swap the
//! implementations of two methods on a live class so that callers of one run
//! the other's code, while the replacement can still reach the original.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **runtime**: Classes, dispatch tables, instances and message sending
//! - **interception**: The swizzle registry and setup-time instrumentation plans
//! - **observability**: Tracing and metrics initialisation
//! - **utils**: Errors and configuration
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use std::sync::Arc;
//! use swizzle_engine::{ClassBuilder, ClassRegistry, Selector, SwizzleRegistry};
//!
//! let classes = Arc::new(ClassRegistry::new());
//! classes
//!     .define_class(
//!         ClassBuilder::new("Greeter")
//!             .method("sayHello", "*", |_| Ok(json!("hello")))
//!             .method("sayHelloMock", "*", |inv| {
//!                 // After the swizzle this selector reaches the original code
//!                 let real = inv.send(&Selector::new("sayHelloMock"), &[])?;
//!                 Ok(json!(format!("mocked {}", real.as_str().unwrap_or_default())))
//!             }),
//!     )
//!     .unwrap();
//!
//! let swizzles = SwizzleRegistry::new(Arc::clone(&classes));
//! swizzles
//!     .swizzle_method(&Selector::new("sayHello"), &Selector::new("sayHelloMock"), "Greeter")
//!     .unwrap();
//!
//! let greeter = classes.instantiate("Greeter").unwrap();
//! let reply = classes.send(&greeter, &Selector::new("sayHello"), &[]).unwrap();
//! assert_eq!(reply, json!("mocked hello"));
//! ```

// Public module exports
pub mod interception;
pub mod observability;
pub mod runtime;
pub mod utils;

// Re-export commonly used types
pub use interception::{InstrumentationPlan, PlanReport, SwizzleRecord, SwizzleRegistry, SwizzleSpec};
pub use runtime::{ClassBuilder, ClassRegistry, Instance, Invocation, Selector, Signature};
pub use utils::config::HarnessConfig;
pub use utils::errors::{InterceptionError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
