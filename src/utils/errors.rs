// src/utils/errors.rs
//! Error types for the interception engine

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InterceptionError>;

/// Errors raised by the runtime, the swizzle registry, and setup code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptionError {
    /// The class name does not resolve in the registry
    #[error("class not found: {0}")]
    ClassNotFound(String),

    /// A selector taking part in a swizzle is not reachable from the class
    #[error("selector `{selector}` not found on class `{class}`")]
    SelectorNotFound { class: String, selector: String },

    /// A message was sent that no class in the receiver's chain implements
    #[error("`{class}` does not recognize selector `{selector}`")]
    UnrecognizedSelector { class: String, selector: String },

    #[error("class already defined: {0}")]
    DuplicateClass(String),

    /// Arguments do not match the signature bound to the selector
    #[error("argument mismatch for `{selector}`: expected {expected}, found {found}")]
    ArgumentMismatch {
        selector: String,
        expected: String,
        found: String,
    },

    /// An implementation returned a value its signature does not allow
    #[error("return type mismatch for `{selector}`: expected `{expected}`, found {found}")]
    ReturnTypeMismatch {
        selector: String,
        expected: String,
        found: String,
    },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Raised by a method implementation
    #[error("implementation failed: {0}")]
    ImplementationFailed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("observability error: {0}")]
    ObservabilityError(String),
}

impl InterceptionError {
    /// Errors that should abort harness setup outright
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InterceptionError::ClassNotFound(_) | InterceptionError::ConfigError(_)
        )
    }
}

impl From<config::ConfigError> for InterceptionError {
    fn from(err: config::ConfigError) -> Self {
        InterceptionError::ConfigError(err.to_string())
    }
}
