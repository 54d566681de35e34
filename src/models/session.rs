//! Session and credential models

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::utils::errors::PortalError;

/// Actor role; selects the API namespace, identity endpoint and login route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

impl Role {
    /// Path prefix of this role's API namespace
    pub fn api_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "/api/admin",
            Role::Faculty => "/api/faculty",
            Role::Student => "/api/students",
        }
    }

    /// Endpoint that answers "who am I" for the current session
    pub fn identity_path(&self) -> &'static str {
        match self {
            Role::Admin => "/api/admin/me",
            Role::Faculty => "/api/faculty/me",
            Role::Student => "/api/students/profile",
        }
    }

    pub fn login_path(&self) -> String {
        format!("{}/login", self.api_prefix())
    }

    pub fn logout_path(&self) -> String {
        format!("{}/logout", self.api_prefix())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            "student" | "students" => Ok(Role::Student),
            other => Err(PortalError::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Body of every role's login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change body used by the admin and faculty endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Password change body used by the student endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPasswordChange {
    pub old_password: String,
    pub new_password: String,
}

impl From<PasswordChange> for StudentPasswordChange {
    fn from(change: PasswordChange) -> Self {
        Self {
            old_password: change.current_password,
            new_password: change.new_password,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Public contact form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}
