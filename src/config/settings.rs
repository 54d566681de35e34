//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::models::Role;
use crate::utils::errors::{PortalError, Result};

/// Main client configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Portal backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
    /// Phrases that mark a text-only 400/409 body as a reassignment
    /// rejection, matched case-insensitively. A structured `code` wins.
    pub legacy_rejection_phrases: Vec<String>,
}

/// Session guard configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub redirect_delay_ms: u64,
    pub admin_login_route: String,
    pub faculty_login_route: String,
    pub student_login_route: String,
}

/// Notification relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub auto_dismiss_ms: u64,
    pub max_visible: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily rolling log files; stderr only when unset
    pub file_path: Option<String>,
    pub json: bool,
}

impl Settings {
    /// Load settings from `config.toml` (optional) and `CAMPUS_PORTAL_<SECTION>__<KEY>` environment variables
    pub fn new() -> Result<Self> {
        Self::load(None)
    }

    /// Load settings, reading the given file instead of `config.toml`
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("CAMPUS_PORTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("backend.legacy_rejection_phrases")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }

    /// Render the settings as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PortalError::Config(format!("Failed to render settings: {}", e)))
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl SessionConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Login route a role is sent to when its session is rejected
    pub fn login_route(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_login_route,
            Role::Faculty => &self.faculty_login_route,
            Role::Student => &self.student_login_route,
        }
    }
}

impl NotificationConfig {
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.auto_dismiss_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            session: SessionConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            user_agent: format!("campus-portal/{}", env!("CARGO_PKG_VERSION")),
            legacy_rejection_phrases: ["replacement", "reassign", "assigned events", "has events"]
                .iter()
                .map(|phrase| phrase.to_string())
                .collect(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: 2000,
            admin_login_route: "/admin/login".to_string(),
            faculty_login_route: "/faculty/login".to_string(),
            student_login_route: "/student/login".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: 3000,
            max_visible: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.session.redirect_delay(), Duration::from_millis(2000));
        assert_eq!(settings.notifications.auto_dismiss(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"http://portal.test:9000\"\ntimeout_seconds = 5\n\n[session]\nredirect_delay_ms = 1200\n"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(settings.backend.base_url, "http://portal.test:9000");
        assert_eq!(settings.backend.timeout_seconds, 5);
        assert_eq!(settings.session.redirect_delay_ms, 1200);
        // untouched sections keep their defaults
        assert_eq!(settings.session.student_login_route, "/student/login");
        assert_eq!(settings.notifications.max_visible, 5);
    }

    #[test]
    fn test_to_toml_round_trips_through_loader() {
        let rendered = Settings::default().to_toml().unwrap();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(rendered.as_bytes()).unwrap();

        let loaded = Settings::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(loaded.backend.base_url, Settings::default().backend.base_url);
        assert_eq!(loaded.logging.level, "info");
    }
}
