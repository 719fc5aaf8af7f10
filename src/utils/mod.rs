// src/utils/mod.rs
//! Shared utilities: error types and configuration loading

pub mod config;
pub mod errors;

pub use self::config::{HarnessConfig, LoggingConfig};
pub use self::errors::{InterceptionError, Result};
