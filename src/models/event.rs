//! Event model

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{first_blank, Searchable};
use super::null_as_default;

/// Event as returned by the admin, faculty and student collection endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<FacultyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_department: Option<String>,
}

/// Nested faculty summary some endpoints embed in an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl Event {
    /// Id of the assigned faculty, whichever shape the endpoint used
    pub fn assigned_faculty_id(&self) -> Option<i64> {
        self.faculty_id.or_else(|| self.faculty.as_ref().map(|f| f.id))
    }

    /// Display name of the assigned faculty, if the endpoint included one
    pub fn assigned_faculty_name(&self) -> Option<&str> {
        self.faculty_name
            .as_deref()
            .or_else(|| self.faculty.as_ref().and_then(|f| f.name.as_deref()))
    }

    /// Calendar date of the event; accepts `YYYY-MM-DD` and RFC 3339 timestamps
    pub fn event_date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date)
    }

    /// True when the event falls on or after `today`; undated events count as upcoming
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.event_date().map_or(true, |date| date >= today)
    }
}

/// Parse the date formats the backend stores for events
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok().map(|dt| dt.date()))
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.venue.as_str(), self.description.as_str()]
    }
}

/// Body of the create-event and update-event requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    pub faculty_id: Option<i64>,
}

impl EventRequest {
    /// Prefill an edit form from an existing event
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            date: event.date.clone(),
            venue: event.venue.clone(),
            faculty_id: event.assigned_faculty_id(),
        }
    }

    /// Required fields must be present and the date must parse
    pub fn validate(&self) -> Result<()> {
        if let Some(field) = first_blank(&[
            ("name", self.name.as_str()),
            ("date", self.date.as_str()),
            ("venue", self.venue.as_str()),
        ]) {
            return Err(PortalError::InvalidInput(format!("Event {} is required", field)));
        }

        if parse_event_date(&self.date).is_none() {
            return Err(PortalError::InvalidInput(format!("Unrecognised event date: {}", self.date)));
        }

        Ok(())
    }
}
