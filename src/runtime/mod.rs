// src/runtime/mod.rs
//! Class runtime with explicit dispatch tables
//!
//! This module provides the object model that interception operates on:
//!
//! - **Selector**: Opaque method names
//! - **Signature**: Return/argument type encodings
//! - **Method**: Implementation + signature, and the `Invocation` context
//! - **Class**: Per-class dispatch table with single inheritance
//! - **Instance**: Live objects with per-object ivars
//! - **Registry**: Class table and the single `send` dispatch path
//!
//! # Architecture
//!
//! ```text
//! call site ── send(obj, sel, args) ──► ClassRegistry::dispatch
//!                                            │
//!                        Class ──lookup──► Superclass ──► ... ──► root
//!                          │ RwLock<HashMap<Selector, Method>>
//!                          ▼
//!                    Method::invoke(&Invocation)
//! ```

pub mod class;
pub mod instance;
pub mod method;
pub mod registry;
pub mod selector;
pub mod signature;

// Re-export commonly used types
pub use class::{Class, ClassBuilder};
pub use instance::Instance;
pub use method::{Imp, ImpId, Invocation, Method};
pub use registry::ClassRegistry;
pub use selector::Selector;
pub use signature::{Signature, TypeCode};
