//! Notification relay
//!
//! Turns load and mutation outcomes into transient toasts. Messages come from
//! templates keyed by outcome with `{param}` substitution. Toasts stack up to
//! `max_visible` (oldest dropped first) and expire after `auto_dismiss_ms`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;
use crate::config::NotificationConfig;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{normalize_whitespace, truncate_text};

/// Longest backend error text shown in a toast; plain-text bodies can be whole HTML pages
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Message template structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub key: String,
    pub level: ToastLevel,
    pub content: String,
}

impl MessageTemplate {
    pub fn new(key: &str, level: ToastLevel, content: &str) -> Self {
        Self {
            key: key.to_string(),
            level,
            content: content.to_string(),
        }
    }
}

/// A rendered, time-limited notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub template_key: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Notification statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_success: u64,
    pub total_failure: u64,
    pub sent_by_template: HashMap<String, u64>,
}

#[derive(Debug)]
struct RelayState {
    toasts: VecDeque<Toast>,
    templates: HashMap<String, MessageTemplate>,
    stats: NotificationStats,
}

/// Shared toast stack; clones observe the same stack
#[derive(Clone, Debug)]
pub struct NotificationRelay {
    config: NotificationConfig,
    state: Arc<Mutex<RelayState>>,
}

impl NotificationRelay {
    /// Create a new relay with the default templates loaded
    pub fn new(config: NotificationConfig) -> Self {
        let state = RelayState {
            toasts: VecDeque::new(),
            templates: Self::load_default_templates(),
            stats: NotificationStats::default(),
        };

        Self {
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Render a template and push it onto the stack
    pub fn notify(&self, template_key: &str, parameters: &[(&str, String)]) -> Toast {
        let mut state = self.lock();

        let (level, text) = match Self::format_message(&state.templates, template_key, parameters) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(template_key = template_key, error = %e, "Falling back to raw template key");
                (ToastLevel::Info, template_key.to_string())
            }
        };

        let now = Utc::now();
        let toast = Toast {
            id: Uuid::new_v4(),
            level,
            template_key: template_key.to_string(),
            text,
            created_at: now,
            expires_at: now + ChronoDuration::milliseconds(self.config.auto_dismiss_ms as i64),
        };

        if level == ToastLevel::Error {
            state.stats.total_failure += 1;
        } else {
            state.stats.total_success += 1;
        }
        *state.stats.sent_by_template.entry(template_key.to_string()).or_insert(0) += 1;

        state.toasts.push_back(toast.clone());
        while state.toasts.len() > self.config.max_visible {
            state.toasts.pop_front();
        }

        debug!(template_key = template_key, level = ?level, text = %toast.text, "Notification raised");
        toast
    }

    /// Report a failed outcome with the error's user-facing text
    pub fn notify_error(&self, error: &PortalError) -> Toast {
        let message = truncate_text(&normalize_whitespace(&error.user_message()), MAX_ERROR_CHARS);
        self.notify("request_failed", &[("message", message)])
    }

    /// Toasts still on screen at `now`, oldest first
    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<Toast> {
        let mut state = self.lock();
        state.toasts.retain(|toast| !toast.is_expired(now));
        state.toasts.iter().cloned().collect()
    }

    pub fn visible(&self) -> Vec<Toast> {
        self.visible_at(Utc::now())
    }

    /// Dismiss a toast before it expires
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.id != id);
        state.toasts.len() != before
    }

    pub fn clear(&self) {
        self.lock().toasts.clear();
    }

    /// Get notification statistics
    pub fn get_stats(&self) -> NotificationStats {
        self.lock().stats.clone()
    }

    /// Reset statistics
    pub fn reset_stats(&self) {
        self.lock().stats = NotificationStats::default();
    }

    /// Add or update a message template
    pub fn add_template(&self, template: MessageTemplate) {
        self.lock().templates.insert(template.key.clone(), template);
    }

    /// Remove a message template
    pub fn remove_template(&self, template_key: &str) -> Option<MessageTemplate> {
        self.lock().templates.remove(template_key)
    }

    /// Get available template keys
    pub fn get_template_keys(&self) -> Vec<String> {
        self.lock().templates.keys().cloned().collect()
    }

    /// Format message using template and parameters
    fn format_message(
        templates: &HashMap<String, MessageTemplate>,
        template_key: &str,
        parameters: &[(&str, String)],
    ) -> Result<(ToastLevel, String)> {
        let template = templates
            .get(template_key)
            .ok_or_else(|| PortalError::InvalidInput(format!("Template not found: {}", template_key)))?;

        let mut formatted = template.content.clone();
        for (key, value) in parameters {
            let placeholder = format!("{{{}}}", key);
            formatted = formatted.replace(&placeholder, value);
        }

        Ok((template.level, formatted))
    }

    /// Load default message templates
    fn load_default_templates() -> HashMap<String, MessageTemplate> {
        use ToastLevel::*;

        [
            ("session_expired", Warning, "Your session has expired. Redirecting to {login_route}..."),
            ("request_failed", Error, "{message}"),
            ("reassignment_cancelled", Info, "Faculty deletion cancelled"),
            ("validation_failed", Warning, "{message}"),
            // loads
            ("dashboard_loaded", Success, "Dashboard loaded"),
            ("events_loaded", Success, "Loaded {count} events"),
            ("faculties_loaded", Success, "Loaded {count} faculties"),
            ("students_loaded", Success, "Loaded {count} students"),
            ("roster_loaded", Success, "Loaded {count} registered students"),
            ("profile_loaded", Success, "Profile loaded"),
            // admin mutations
            ("event_created", Success, "Event \"{name}\" created"),
            ("event_updated", Success, "Event \"{name}\" updated"),
            ("event_deleted", Success, "Event deleted"),
            ("event_reassigned", Success, "Event reassigned"),
            ("faculty_approved", Success, "Faculty approved"),
            ("faculty_rejected", Success, "Faculty rejected"),
            ("faculty_updated", Success, "Faculty updated"),
            ("faculty_deleted", Success, "Faculty deleted"),
            ("student_updated", Success, "Student updated"),
            ("student_deleted", Success, "Student deleted"),
            // student and faculty mutations
            ("event_registered", Success, "Registered for \"{name}\""),
            ("event_unregistered", Success, "Unregistered from \"{name}\""),
            ("attendance_marked", Success, "Marked {student} as {status}"),
            ("profile_updated", Success, "Profile updated"),
            ("password_updated", Success, "Password updated"),
            // account flows
            ("login_succeeded", Success, "Welcome back, {name}"),
            ("logged_out", Info, "Logged out"),
            ("signup_succeeded", Success, "Account created. You can now log in"),
            ("registration_submitted", Success, "Registration submitted. Wait for admin approval"),
            ("password_set", Success, "Password set. You can now log in"),
            ("password_reset_requested", Info, "Password reset link sent to {email}"),
            ("password_reset", Success, "Password reset. You can now log in"),
            ("contact_sent", Success, "Message sent. We will get back to you soon"),
        ]
        .into_iter()
        .map(|(key, level, content)| (key.to_string(), MessageTemplate::new(key, level, content)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay(max_visible: usize) -> NotificationRelay {
        NotificationRelay::new(NotificationConfig {
            auto_dismiss_ms: 3000,
            max_visible,
        })
    }

    #[test]
    fn test_format_message() {
        let relay = relay(5);
        let toast = relay.notify("event_created", &[("name", "Expo".to_string())]);
        assert_eq!(toast.text, "Event \"Expo\" created");
        assert_eq!(toast.level, ToastLevel::Success);
    }

    #[test]
    fn test_unknown_template_still_notifies() {
        let relay = relay(5);
        let toast = relay.notify("no_such_template", &[]);
        assert_eq!(toast.text, "no_such_template");
        assert_eq!(relay.visible().len(), 1);
    }

    #[test]
    fn test_stack_limit_drops_oldest() {
        let relay = relay(2);
        let first = relay.notify("event_deleted", &[]);
        relay.notify("faculty_deleted", &[]);
        relay.notify("student_deleted", &[]);

        let visible = relay.visible();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|t| t.id != first.id));
        assert_eq!(visible[1].template_key, "student_deleted");
    }

    #[test]
    fn test_auto_dismiss() {
        let relay = relay(5);
        let toast = relay.notify("logged_out", &[]);
        assert_eq!(relay.visible_at(toast.created_at).len(), 1);
        assert!(relay.visible_at(toast.expires_at).is_empty());
    }

    #[test]
    fn test_dismiss_and_stats() {
        let relay = relay(5);
        let toast = relay.notify("event_deleted", &[]);
        relay.notify_error(&PortalError::Http { status: 500, message: "boom".to_string() });

        assert!(relay.dismiss(toast.id));
        assert!(!relay.dismiss(toast.id));

        let stats = relay.get_stats();
        assert_eq!(stats.total_success, 1);
        assert_eq!(stats.total_failure, 1);
        assert_eq!(stats.sent_by_template.get("request_failed"), Some(&1));

        relay.reset_stats();
        assert_eq!(relay.get_stats(), NotificationStats::default());
    }

    #[test]
    fn test_long_error_text_is_shortened() {
        let relay = relay(5);
        let page = format!("<html>\n  <body>{}</body>\n</html>", "x".repeat(500));
        let toast = relay.notify_error(&PortalError::Http { status: 502, message: page });
        assert_eq!(toast.text.chars().count(), MAX_ERROR_CHARS);
        assert!(toast.text.starts_with("<html> <body>"));
        assert!(toast.text.ends_with("..."));
    }

    #[test]
    fn test_template_management() {
        let relay = relay(5);
        relay.add_template(MessageTemplate::new("test", ToastLevel::Info, "Hello {who}"));
        assert!(relay.get_template_keys().contains(&"test".to_string()));
        assert_eq!(relay.notify("test", &[("who", "you".to_string())]).text, "Hello you");

        assert!(relay.remove_template("test").is_some());
        assert!(!relay.get_template_keys().contains(&"test".to_string()));
    }
}
