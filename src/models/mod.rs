//! Data models module
//!
//! Wire shapes of the portal backend plus the client-side types derived from them

use serde::{Deserialize, Deserializer};

pub mod admin;
pub mod attendance;
pub mod event;
pub mod faculty;
pub mod session;
pub mod student;

// Re-export commonly used models
pub use admin::{Admin, AdminUpdate};
pub use attendance::{Attendance, AttendanceSummary, RegisteredEvent, StudentAttendance};
pub use event::{Event, EventRequest, FacultyRef};
pub use faculty::{Faculty, FacultyRegistration, FacultyUpdate};
pub use session::{
    ContactRequest, ForgotPasswordRequest, LoginRequest, PasswordChange, ResetPasswordRequest, Role,
    StudentPasswordChange,
};
pub use student::{Student, StudentSignup, StudentUpdate, StudentWithEvents};

/// The backend serializes missing text and lists as `null`; treat those as empty
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
