// src/observability/mod.rs
//! Logging and metrics setup
//!
//! Both initialisers are meant to be called once, early in harness setup.
//! A second call reports an error instead of replacing the installed
//! subscriber or recorder.

use crate::utils::config::LoggingConfig;
use crate::utils::errors::{InterceptionError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Swizzles applied, labelled by class
pub const SWIZZLE_APPLIED: &str = "swizzle_applied_total";

/// Swizzles rejected, labelled by class
pub const SWIZZLE_FAILED: &str = "swizzle_failed_total";

/// Forwarders synthesized for inherited selectors, labelled by class
pub const SWIZZLE_FORWARDERS: &str = "swizzle_forwarders_synthesized_total";

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config, std::env::var("RUST_LOG").ok().as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| {
        InterceptionError::ObservabilityError(format!("Failed to install subscriber: {}", e))
    })
}

/// Build the log filter, preferring a `RUST_LOG` style override
fn build_filter(config: &LoggingConfig, env_override: Option<&str>) -> Result<EnvFilter> {
    if let Some(directives) = env_override {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok(filter);
        }
    }

    EnvFilter::try_new(&config.level).map_err(|e| {
        InterceptionError::ObservabilityError(format!(
            "Invalid log level '{}': {}",
            config.level, e
        ))
    })
}

/// Install the Prometheus metrics recorder
///
/// The returned handle renders the current metrics in text exposition format.
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new().install_recorder().map_err(|e| {
        InterceptionError::ObservabilityError(format!("Failed to install metrics recorder: {}", e))
    })
}
