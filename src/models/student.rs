//! Student model

use serde::{Deserialize, Serialize};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::Searchable;
use super::faculty::validate_contact;
use super::null_as_default;

/// Student profile as returned by `GET /api/students/profile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
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
}

/// Admin directory row: a student plus the names of the events they joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWithEvents {
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
    #[serde(default, deserialize_with = "null_as_default")]
    pub registered_events: Vec<String>,
}

impl StudentWithEvents {
    pub fn registration_count(&self) -> usize {
        self.registered_events.len()
    }
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.department.as_str()]
    }
}

impl Searchable for StudentWithEvents {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.department.as_str(),
        ];
        fields.extend(self.registered_events.iter().map(String::as_str));
        fields
    }
}

/// Editable student fields for admin edits and profile updates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
}

impl StudentUpdate {
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            department: student.department.clone(),
            gender: student.gender.clone(),
        }
    }

    pub fn from_directory_row(row: &StudentWithEvents) -> Self {
        Self {
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            department: row.department.clone(),
            gender: row.gender.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.name, &self.email, &self.phone)
    }
}

/// Body of `POST /api/students/signup`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSignup {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub password: String,
}

impl StudentSignup {
    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.name, &self.email, &self.phone)?;
        if self.password.len() < 6 {
            return Err(PortalError::InvalidInput(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        Ok(())
    }
}
