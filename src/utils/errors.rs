//! Error handling for the campus portal client
//!
//! This module defines the error type returned by every client operation
//! and the classification helpers views use to pick a follow-up flow.

use std::fmt;
use thiserror::Error;

/// Main error type for portal client operations
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Request rejected ({kind}): {message}")]
    Rejected { kind: RejectionKind, message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("View closed before the request completed")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PortalError {
    fn from(err: config::ConfigError) -> Self {
        PortalError::Config(err.to_string())
    }
}

/// Business-rule rejections the backend reports through the `code` field
/// of an error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    /// Faculty still owns events; delete again with a replacement id
    ReassignmentRequired,
    AlreadyRegistered,
    NotRegistered,
    NotFound,
    InvalidCredentials,
    Other(String),
}

impl RejectionKind {
    /// Map a backend error code onto a rejection kind
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "REASSIGNMENT_REQUIRED" => RejectionKind::ReassignmentRequired,
            "ALREADY_REGISTERED" => RejectionKind::AlreadyRegistered,
            "NOT_REGISTERED" => RejectionKind::NotRegistered,
            "NOT_FOUND" => RejectionKind::NotFound,
            "INVALID_CREDENTIALS" => RejectionKind::InvalidCredentials,
            other => RejectionKind::Other(other.to_string()),
        }
    }

    /// Wire code for this kind
    pub fn code(&self) -> &str {
        match self {
            RejectionKind::ReassignmentRequired => "REASSIGNMENT_REQUIRED",
            RejectionKind::AlreadyRegistered => "ALREADY_REGISTERED",
            RejectionKind::NotRegistered => "NOT_REGISTERED",
            RejectionKind::NotFound => "NOT_FOUND",
            RejectionKind::InvalidCredentials => "INVALID_CREDENTIALS",
            RejectionKind::Other(code) => code,
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result type alias for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    /// True when the session is gone and the user must log in again
    pub fn needs_reauth(&self) -> bool {
        matches!(self, PortalError::Unauthorized(_))
    }

    /// True when a faculty delete was blocked by assigned events
    pub fn requires_reassignment(&self) -> bool {
        matches!(
            self,
            PortalError::Rejected { kind: RejectionKind::ReassignmentRequired, .. }
        )
    }

    /// Check if the user can complete the action by retrying or by an alternate flow
    pub fn is_recoverable(&self) -> bool {
        match self {
            PortalError::Unauthorized(_) => false,
            PortalError::Rejected { .. } => true,
            PortalError::Http { status, .. } => *status >= 500,
            PortalError::Transport(_) => true,
            PortalError::Serialization(_) => false,
            PortalError::UrlParse(_) => false,
            PortalError::Config(_) => false,
            PortalError::InvalidInput(_) => true,
            PortalError::Cancelled => false,
            PortalError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PortalError::Config(_) => ErrorSeverity::Critical,
            PortalError::Unauthorized(_) => ErrorSeverity::Warning,
            PortalError::Rejected { .. } => ErrorSeverity::Warning,
            PortalError::InvalidInput(_) => ErrorSeverity::Info,
            PortalError::Cancelled => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Text suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Rejected { message, kind } if message.is_empty() => kind.to_string(),
            PortalError::Rejected { message, .. } => message.clone(),
            PortalError::Http { status, message } if message.is_empty() => format!("HTTP {}", status),
            PortalError::Http { message, .. } => message.clone(),
            PortalError::Transport(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            PortalError::Transport(_) => "Could not reach the server".to_string(),
            PortalError::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
