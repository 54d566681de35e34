//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the portal client.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::models::Role;
use crate::utils::errors::{PortalError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| PortalError::Config(format!("Invalid log filter {}: {}", config.level, e)))?;

    let (file_layer, guard) = match &config.file_path {
        Some(dir) if !dir.is_empty() => {
            let file_appender = tracing_appender::rolling::daily(dir, "campus-portal.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer);

    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| PortalError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log the outcome of a session check
pub fn log_session_check(role: Role, authenticated: bool, details: Option<&str>) {
    if authenticated {
        debug!(role = %role, "Session check: session is valid");
    } else {
        warn!(
            role = %role,
            details = details,
            "Session check: not authenticated"
        );
    }
}

/// Log mutation outcomes with structured data
pub fn log_mutation(action: &str, target: Option<i64>, success: bool, details: Option<&str>) {
    if success {
        info!(
            action = action,
            target = target,
            details = details,
            "Mutation applied"
        );
    } else {
        error!(
            action = action,
            target = target,
            details = details,
            "Mutation failed"
        );
    }
}

/// Log a dependent lookup that fell back to its "unknown" value
pub fn log_enrichment_degraded(resource: &str, key: i64, error: &str) {
    warn!(
        resource = resource,
        key = key,
        error = error,
        "Dependent lookup failed, using fallback value"
    );
}

/// Log API errors with context
pub fn log_api_error(endpoint: &str, error: &str, context: Option<&str>) {
    error!(
        endpoint = endpoint,
        error = error,
        context = context,
        "API error occurred"
    );
}

/// Log request timing
pub fn log_request(method: &str, path: &str, status: u16, duration_ms: u64) {
    debug!(
        method = method,
        path = path,
        status = status,
        duration_ms = duration_ms,
        "Backend request completed"
    );
}
