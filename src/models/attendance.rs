//! Attendance model
//!
//! The backend stores attendance as a nullable boolean per (student, event)
//! registration. The client works with the tri-state [`Attendance`] instead.

use std::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use super::event::Event;
use super::null_as_default;

/// Tri-state attendance for one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Attendance {
    Present,
    Absent,
    #[default]
    NotMarked,
}

impl Attendance {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Attendance::Present,
            Some(false) => Attendance::Absent,
            None => Attendance::NotMarked,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Attendance::Present => Some(true),
            Attendance::Absent => Some(false),
            Attendance::NotMarked => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Attendance::Present => "Present",
            Attendance::Absent => "Absent",
            Attendance::NotMarked => "Not Marked",
        }
    }
}

impl From<bool> for Attendance {
    fn from(present: bool) -> Self {
        Attendance::from_flag(Some(present))
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Attendance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_flag().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Attendance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Attendance::from_flag(Option::<bool>::deserialize(deserializer)?))
    }
}

/// One row of an event roster as seen by faculty and admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    pub student_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(default)]
    pub attendance: Attendance,
}

/// A registered event joined with the current student's attendance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredEvent {
    pub event: Event,
    pub attendance: Attendance,
}

/// Attendance counts over a set of registrations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub not_marked: usize,
}

impl AttendanceSummary {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.not_marked
    }
}

impl FromIterator<Attendance> for AttendanceSummary {
    fn from_iter<I: IntoIterator<Item = Attendance>>(iter: I) -> Self {
        let mut summary = AttendanceSummary::default();
        for attendance in iter {
            match attendance {
                Attendance::Present => summary.present += 1,
                Attendance::Absent => summary.absent += 1,
                Attendance::NotMarked => summary.not_marked += 1,
            }
        }
        summary
    }
}
