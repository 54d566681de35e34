//! Configuration validation module
//!
//! This module provides validation functions for client configuration
//! to ensure all required settings are properly configured.

use url::Url;
use crate::utils::errors::{PortalError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_backend_config(&settings.backend)?;
    validate_session_config(&settings.session)?;
    validate_notification_config(&settings.notifications)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate backend configuration
fn validate_backend_config(config: &super::BackendConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(PortalError::Config(
            "Backend base URL is required".to_string()
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| PortalError::Config(format!("Invalid backend base URL {}: {}", config.base_url, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(PortalError::Config(
            format!("Backend base URL must be http or https, got {}", url.scheme())
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(PortalError::Config(
            "Backend timeout must be greater than 0".to_string()
        ));
    }

    if config.connect_timeout_seconds == 0 {
        return Err(PortalError::Config(
            "Backend connect timeout must be greater than 0".to_string()
        ));
    }

    if config.connect_timeout_seconds > config.timeout_seconds {
        return Err(PortalError::Config(
            "Connect timeout cannot be greater than request timeout".to_string()
        ));
    }

    if config.legacy_rejection_phrases.iter().any(|p| p.trim().is_empty()) {
        return Err(PortalError::Config(
            "Legacy rejection phrases must not be blank".to_string()
        ));
    }

    Ok(())
}

/// Validate session guard configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    let routes = [
        ("admin", &config.admin_login_route),
        ("faculty", &config.faculty_login_route),
        ("student", &config.student_login_route),
    ];

    for (role, route) in routes {
        if !route.starts_with('/') {
            return Err(PortalError::Config(
                format!("Login route for {} must be an absolute path, got {:?}", role, route)
            ));
        }
    }

    Ok(())
}

/// Validate notification configuration
fn validate_notification_config(config: &super::NotificationConfig) -> Result<()> {
    if config.auto_dismiss_ms == 0 {
        return Err(PortalError::Config(
            "Notification auto-dismiss duration must be greater than 0".to_string()
        ));
    }

    if config.max_visible == 0 {
        return Err(PortalError::Config(
            "At least one visible notification must be allowed".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PortalError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if config.level.contains('=') || config.level.contains(',') {
        // directive strings such as "campus_portal=debug,info"
        tracing_subscriber::EnvFilter::try_new(&config.level)
            .map_err(|e| PortalError::Config(format!("Invalid log filter {}: {}", config.level, e)))?;
    } else if !valid_levels.contains(&config.level.as_str()) {
        return Err(PortalError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
