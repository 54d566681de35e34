//! Faculty model

use serde::{Deserialize, Serialize};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{first_blank, is_valid_email, is_valid_phone, Searchable};
use super::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub assigned_events_count: u32,
}

impl Faculty {
    pub fn has_assigned_events(&self) -> bool {
        self.assigned_events_count > 0
    }
}

impl Searchable for Faculty {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.department.as_str(),
        ]
    }
}

/// Faculties that may own events: approved ones, minus `exclude`
pub fn assignable<'a>(faculties: &'a [Faculty], exclude: Option<i64>) -> Vec<&'a Faculty> {
    faculties
        .iter()
        .filter(|f| f.approved && Some(f.id) != exclude)
        .collect()
}

/// Editable faculty fields; body of the admin update and faculty self-update requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
}

impl FacultyUpdate {
    pub fn from_faculty(faculty: &Faculty) -> Self {
        Self {
            name: faculty.name.clone(),
            email: faculty.email.clone(),
            phone: faculty.phone.clone(),
            department: faculty.department.clone(),
            gender: faculty.gender.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.name, &self.email, &self.phone)
    }
}

/// Self-registration request; the account stays unapproved until an admin approves it
pub type FacultyRegistration = FacultyUpdate;

/// Shared check for name / e-mail / phone form fields
pub(crate) fn validate_contact(name: &str, email: &str, phone: &str) -> Result<()> {
    if let Some(field) = first_blank(&[("name", name), ("email", email)]) {
        return Err(PortalError::InvalidInput(format!("The {} field is required", field)));
    }
    if !is_valid_email(email) {
        return Err(PortalError::InvalidInput(format!("Invalid email address: {}", email)));
    }
    if !phone.trim().is_empty() && !is_valid_phone(phone) {
        return Err(PortalError::InvalidInput(format!("Invalid phone number: {}", phone)));
    }
    Ok(())
}
