//! Admin model

use serde::{Deserialize, Serialize};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{first_blank, is_valid_email};
use super::null_as_default;

/// Admin identity as returned by `GET /api/admin/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

/// Body of `PUT /api/admin/update`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminUpdate {
    pub username: String,
    pub email: String,
}

impl AdminUpdate {
    pub fn from_admin(admin: &Admin) -> Self {
        Self {
            username: admin.username.clone(),
            email: admin.email.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(field) = first_blank(&[
            ("username", self.username.as_str()),
            ("email", self.email.as_str()),
        ]) {
            return Err(PortalError::InvalidInput(format!("The {} field is required", field)));
        }
        if !is_valid_email(&self.email) {
            return Err(PortalError::InvalidInput(format!("Invalid email address: {}", self.email)));
        }
        Ok(())
    }
}
