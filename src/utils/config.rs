// src/utils/config.rs
//! Harness configuration
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `swizzle.{toml,yaml,json}` in the working directory (optional)
//! 3. Environment variables prefixed with `SWIZZLE__`, using `__` as the
//!    nesting separator (`SWIZZLE__LOGGING__LEVEL=debug`)

use crate::interception::plan::InstrumentationPlan;
use crate::utils::errors::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default configuration file stem
pub const DEFAULT_CONFIG_NAME: &str = "swizzle";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level harness configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub logging: LoggingConfig,

    /// Swizzles applied during setup
    pub interception: InstrumentationPlan,
}

impl HarnessConfig {
    /// Load from the default file (if present) and the environment
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize::<HarnessConfig>()?;

        debug!("Loaded harness config: {:?}", config);
        Ok(config)
    }

    /// Load from an explicit file; the environment still overrides it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize::<HarnessConfig>()?;

        debug!("Loaded harness config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    fn environment() -> Environment {
        Environment::with_prefix("SWIZZLE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }
}
